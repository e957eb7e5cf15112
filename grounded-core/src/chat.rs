//! Grounded chat-completion client for Azure OpenAI.
//!
//! Sends a single-question chat request with an `azure_search` data source
//! attached, so the deployment retrieves context from the configured index
//! before answering. Follows the OpenAI chat completions response format.

use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::config::{OpenAiConfig, SearchConfig, resolve_key};
use crate::error::{ChatError, ConfigError};
use crate::types::{Answer, Message};

/// Grounding parameters attached to every chat request.
///
/// Immutable for the process lifetime.
struct Grounding {
    endpoint: String,
    index: String,
    key: String,
}

/// Client for grounded chat completions against an Azure OpenAI deployment.
pub struct ChatClient {
    client: Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    grounding: Grounding,
}

impl ChatClient {
    /// Create a new client from configuration.
    ///
    /// Resolves both API keys from the environment variables named in the
    /// config; a missing key fails here, before any network call.
    pub fn new(openai: &OpenAiConfig, search: &SearchConfig) -> Result<Self, ConfigError> {
        let api_key = resolve_key(&openai.api_key_env)?;
        let search_key = resolve_key(&search.api_key_env)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(openai.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: openai.endpoint.trim_end_matches('/').to_string(),
            deployment: openai.deployment.clone(),
            api_version: openai.api_version.clone(),
            api_key,
            grounding: Grounding {
                endpoint: search.endpoint.clone(),
                index: search.index.clone(),
                key: search_key,
            },
        })
    }

    /// The deployment-scoped chat completions endpoint.
    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    /// Build the request body: exactly one user message plus the
    /// `azure_search` grounding data source.
    fn build_body(&self, question: &str) -> Value {
        json!({
            "model": self.deployment,
            "messages": [Message::user(question)],
            "data_sources": [
                {
                    "type": "azure_search",
                    "parameters": {
                        "endpoint": self.grounding.endpoint,
                        "index_name": self.grounding.index,
                        "authentication": {
                            "type": "api_key",
                            "key": self.grounding.key,
                        }
                    }
                }
            ],
        })
    }

    /// Parse an OpenAI-format response body into an [`Answer`].
    fn parse_response(body: &Value) -> Result<Answer, ChatError> {
        let choice =
            body.get("choices")
                .and_then(|c| c.get(0))
                .ok_or_else(|| ChatError::ResponseParse {
                    message: "No choices in response".to_string(),
                })?;

        let message = choice.get("message").ok_or_else(|| ChatError::ResponseParse {
            message: "No message in choice".to_string(),
        })?;

        let content = message
            .get("content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| ChatError::ResponseParse {
                message: "No content in message".to_string(),
            })?
            .to_string();

        // Citation/grounding metadata, when the backend returned any.
        let context = message.get("context").filter(|c| !c.is_null()).cloned();

        Ok(Answer { content, context })
    }

    /// Map an HTTP status code to the appropriate ChatError.
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> ChatError {
        match status.as_u16() {
            401 => {
                debug!(body = %body, "Authentication failed (401)");
                ChatError::AuthFailed {
                    provider: "Azure OpenAI".to_string(),
                }
            }
            429 => {
                // Try to parse a retry hint from "... try again in Xs"
                let retry_secs = serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|v| {
                        v.get("error")?
                            .get("message")?
                            .as_str()
                            .map(|s| s.to_string())
                    })
                    .and_then(|msg| {
                        msg.split("in ")
                            .last()
                            .and_then(|s| s.trim_end_matches('s').parse::<u64>().ok())
                    })
                    .unwrap_or(5);
                ChatError::RateLimited {
                    retry_after_secs: retry_secs,
                }
            }
            status if status >= 500 => ChatError::ApiRequest {
                message: format!("Server error ({}): {}", status, body),
            },
            _ => ChatError::ApiRequest {
                message: format!("HTTP {}: {}", status, body),
            },
        }
    }

    /// Ask a single question and return the grounded answer.
    ///
    /// One request, one response; no retry is attempted.
    pub async fn ask(&self, question: &str) -> Result<Answer, ChatError> {
        let url = self.completions_url();
        let body = self.build_body(question);
        debug!(url = %url, deployment = %self.deployment, "Sending grounded chat request");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::ApiRequest {
                message: format!("Request failed: {}", e),
            })?;

        let status = response.status();
        let response_body = response.text().await.map_err(|e| ChatError::ApiRequest {
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &response_body));
        }

        let json: Value =
            serde_json::from_str(&response_body).map_err(|e| ChatError::ResponseParse {
                message: format!("Invalid JSON: {}", e),
            })?;

        Self::parse_response(&json)
    }
}
