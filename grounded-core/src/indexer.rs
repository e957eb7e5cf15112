//! Azure AI Search indexer trigger.
//!
//! Fires a single authenticated POST against the indexer `run` endpoint. The
//! service queues the run asynchronously and acknowledges with HTTP 202; this
//! client does not wait for indexing to complete.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::config::{IndexerConfig, resolve_key};
use crate::error::{ConfigError, TriggerError};

/// Client for triggering a search indexer run.
pub struct IndexerClient {
    client: Client,
    service: String,
    indexer: String,
    api_version: String,
    admin_key: String,
}

impl IndexerClient {
    /// Create a new client from configuration.
    ///
    /// Reads the admin key from the environment variable named in
    /// `config.admin_key_env` and fails before any network call if it is
    /// absent.
    pub fn new(config: &IndexerConfig) -> Result<Self, ConfigError> {
        let admin_key = resolve_key(&config.admin_key_env)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            service: config.service.clone(),
            indexer: config.name.clone(),
            api_version: config.api_version.clone(),
            admin_key,
        })
    }

    /// The indexer run endpoint for this client.
    pub fn run_url(&self) -> String {
        format!(
            "https://{}.search.windows.net/indexers/{}/run?api-version={}",
            self.service, self.indexer, self.api_version
        )
    }

    /// Trigger an indexer run.
    ///
    /// Every call is an independent POST; there is no local caching or
    /// deduplication. A 202 means the run was queued. Any other status is
    /// reported as [`TriggerError::Rejected`] with the status code and
    /// response body as diagnostic detail.
    pub async fn trigger(&self) -> Result<(), TriggerError> {
        let url = self.run_url();
        debug!(url = %url, indexer = %self.indexer, "Triggering indexer run");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.admin_key)
            .send()
            .await
            .map_err(|e| TriggerError::Request {
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::check_status(status, &body)
    }

    /// Evaluate the trigger response status. 202 Accepted means success.
    fn check_status(status: StatusCode, body: &str) -> Result<(), TriggerError> {
        if status == StatusCode::ACCEPTED {
            Ok(())
        } else {
            Err(TriggerError::Rejected {
                status: status.as_u16(),
                body: body.to_string(),
            })
        }
    }
}
