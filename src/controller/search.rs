//! Catalog search controller methods

use tokio::task::JoinHandle;

use crate::model::{ActiveSection, ResultsView};
use super::AppController;

impl AppController {
    /// Issue a lookup for `query` in the background.
    ///
    /// Returns `None` for blank queries. Only the most recently issued lookup
    /// may replace the results area; older completions are dropped. Focus moves
    /// to the results only if the search box was not edited in the meantime.
    pub async fn perform_search(&self, query: &str) -> Option<JoinHandle<()>> {
        let ticket = {
            let mut model = self.model.lock().await;
            model.search_mut().begin(query)
        };
        let Some(ticket) = ticket else {
            tracing::debug!("Ignoring blank search query");
            return None;
        };

        tracing::debug!(query = %ticket.term, seq = ticket.seq, "Performing search");

        let controller = self.clone();
        Some(tokio::spawn(async move {
            let outcome = controller.client.search(&ticket.term).await;
            crate::log_request_result!("search", outcome);

            if let Ok(results) = &outcome {
                tracing::info!(
                    query = %ticket.term,
                    seq = ticket.seq,
                    results = results.len(),
                    "Search completed"
                );
            }

            let mut model = controller.model.lock().await;
            if !model.search_mut().complete(ticket.seq, outcome) {
                tracing::debug!(
                    seq = ticket.seq,
                    latest = model.search().latest_seq(),
                    "Discarding stale search response"
                );
                return;
            }

            // Only hand focus over when the box still holds what was searched
            let query_unchanged = model.search_query().trim() == ticket.term;
            if query_unchanged && matches!(model.search().view(), ResultsView::Results { .. }) {
                model.set_active_section(ActiveSection::Results);
            }
        }))
    }
}
