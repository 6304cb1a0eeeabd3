//! iTunes catalog search client

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::content::SearchResult;
use crate::fetch::HttpFetch;

pub const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const SEARCH_LIMIT: u32 = 25;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    result_count: u32,
    #[serde(default)]
    results: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    track_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    preview_url: Option<String>,
}

impl CatalogEntry {
    fn into_result(self) -> Option<SearchResult> {
        let preview_url = self.preview_url.filter(|url| !url.trim().is_empty())?;
        Some(SearchResult {
            title: self.track_name.unwrap_or_default(),
            artist: self.artist_name.unwrap_or_default(),
            preview_url,
            artwork_url: self.artwork_url100.unwrap_or_default(),
        })
    }
}

/// Catalog client issuing one lookup per search
#[derive(Clone)]
pub struct ItunesClient {
    fetcher: Arc<dyn HttpFetch>,
    endpoint: String,
}

impl ItunesClient {
    pub fn new(fetcher: Arc<dyn HttpFetch>, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }

    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}?term={}&media=music&entity=song&limit={}",
            self.endpoint,
            urlencoding::encode(term),
            SEARCH_LIMIT
        )
    }

    /// Look up `term` and return the previewable tracks in catalog order.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchResult>> {
        let url = self.search_url(term);
        tracing::debug!(url = %url, "Catalog lookup started");

        let value = self.fetcher.get_json(url).await?;
        let response: SearchResponse =
            serde_json::from_value(value).context("Unexpected catalog response shape")?;

        let total = response.result_count;
        let results: Vec<SearchResult> = response
            .results
            .into_iter()
            .filter_map(CatalogEntry::into_result)
            .collect();

        tracing::debug!(
            result_count = total,
            playable = results.len(),
            "Catalog lookup finished"
        );
        Ok(results)
    }
}
