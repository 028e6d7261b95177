use async_trait::async_trait;
use kindling_core::{ItemId, ItemSource, RawItem, SourceError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

type Result<T> = std::result::Result<T, SourceError>;

/// Base location of the public Hacker News API.
pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Hacker News item API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HnClient {
    http: Client,
    base_url: String,
}

impl HnClient {
    /// Creates a client against the public API with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base location.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom base location and request timeout.
    pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issues a GET and decodes the JSON body, racing the cancellation
    /// token at both suspension points.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let url = self.url(path);
        trace!(%url, "issuing upstream request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SourceError::Cancelled),
            result = self.http.get(url.as_str()).send() => {
                result.map_err(|e| SourceError::Http(e.to_string()))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SourceError::Cancelled),
            result = response.json::<T>() => {
                result.map_err(|e| SourceError::Decode(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl ItemSource for HnClient {
    async fn fetch_best_ids(&self, cancel: &CancellationToken) -> Result<Vec<ItemId>> {
        let ids: Vec<ItemId> = self.get_json("beststories.json", cancel).await?;
        debug!(count = ids.len(), "fetched best story ids");
        Ok(ids)
    }

    async fn fetch_item(&self, id: ItemId, cancel: &CancellationToken) -> Result<Option<RawItem>> {
        // The API answers deleted and unknown ids with a literal `null`
        // body, which decodes to `None` here.
        let item: Option<RawItem> = self.get_json(&format!("item/{id}.json"), cancel).await?;
        debug!(%id, found = item.is_some(), "fetched item detail");
        Ok(item)
    }
}
