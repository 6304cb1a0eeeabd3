//! HTTP access for the catalog lookup and preview downloads
//!
//! Everything that leaves the process goes through [`HttpFetch`], so the
//! controllers can be driven by a fake in tests.

use anyhow::{Context, Result};
use futures::future::BoxFuture;

/// Black-box fetch capability: given a URL, return parsed JSON or raw bytes.
pub trait HttpFetch: Send + Sync {
    fn get_json(&self, url: String) -> BoxFuture<'static, Result<serde_json::Value>>;

    fn get_bytes(&self, url: String) -> BoxFuture<'static, Result<Vec<u8>>>;
}

/// `reqwest`-backed fetcher used by the real application
#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpFetch for ReqwestFetcher {
    fn get_json(&self, url: String) -> BoxFuture<'static, Result<serde_json::Value>> {
        let client = self.client.clone();
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Request to {url} failed"))?
                .error_for_status()
                .context("Catalog returned an error status")?;

            let value = response
                .json::<serde_json::Value>()
                .await
                .context("Catalog response is not valid JSON")?;
            Ok(value)
        })
    }

    fn get_bytes(&self, url: String) -> BoxFuture<'static, Result<Vec<u8>>> {
        let client = self.client.clone();
        Box::pin(async move {
            let bytes = client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Download of {url} failed"))?
                .error_for_status()
                .context("Preview host returned an error status")?
                .bytes()
                .await
                .context("Preview download was interrupted")?;
            Ok(bytes.to_vec())
        })
    }
}
