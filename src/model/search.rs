//! Search lifecycle: issuing lookups and applying only the latest response

use anyhow::Result;

use super::content::{ResultsView, SearchResult};

/// Handle for one issued lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub term: String,
}

#[derive(Clone, Debug, Default)]
pub struct SearchState {
    latest_seq: u64,
    view: ResultsView,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Start a lookup for `query`, replacing the results area with the
    /// loading placeholder. Blank queries issue nothing.
    pub fn begin(&mut self, query: &str) -> Option<SearchTicket> {
        let term = query.trim();
        if term.is_empty() {
            return None;
        }

        self.latest_seq += 1;
        self.view = ResultsView::Loading;

        Some(SearchTicket {
            seq: self.latest_seq,
            term: term.to_string(),
        })
    }

    /// Apply the outcome of lookup `seq`. Returns `false` when a newer lookup
    /// has been issued since, in which case the outcome is dropped.
    pub fn complete(&mut self, seq: u64, outcome: Result<Vec<SearchResult>>) -> bool {
        if seq != self.latest_seq {
            return false;
        }

        self.view = match outcome {
            Ok(results) if results.is_empty() => ResultsView::NoResults,
            Ok(results) => ResultsView::Results {
                results,
                selected_index: 0,
            },
            Err(_) => ResultsView::Failed,
        };
        true
    }

    pub fn move_up(&mut self) {
        if let ResultsView::Results { selected_index, .. } = &mut self.view {
            *selected_index = selected_index.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if let ResultsView::Results {
            results,
            selected_index,
        } = &mut self.view
        {
            if *selected_index < results.len().saturating_sub(1) {
                *selected_index += 1;
            }
        }
    }

    pub fn selected_result(&self) -> Option<&SearchResult> {
        match &self.view {
            ResultsView::Results {
                results,
                selected_index,
            } => results.get(*selected_index),
            _ => None,
        }
    }
}
