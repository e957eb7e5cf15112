//! Error types for the grounded core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering configuration, the indexer trigger, and the chat client.

/// Top-level error type for the grounded core library.
#[derive(Debug, thiserror::Error)]
pub enum GroundedError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Indexer trigger error: {0}")]
    Trigger(#[from] TriggerError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system.
///
/// All configuration problems are detected before any network call is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting '{field}' (set it in config.toml or via ${env_var})")]
    MissingField { field: String, env_var: String },

    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from the indexer trigger call.
///
/// These are recovered locally: the caller logs them and continues.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Trigger request failed: {message}")]
    Request { message: String },

    #[error("Indexer run rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors from the grounded chat-completion call. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A type alias for results using the top-level `GroundedError`.
pub type Result<T> = std::result::Result<T, GroundedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = GroundedError::Config(ConfigError::MissingField {
            field: "openai.endpoint".into(),
            env_var: "AZURE_OAI_ENDPOINT".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required setting 'openai.endpoint' \
             (set it in config.toml or via $AZURE_OAI_ENDPOINT)"
        );
    }

    #[test]
    fn test_error_display_trigger() {
        let err = GroundedError::Trigger(TriggerError::Rejected {
            status: 404,
            body: "indexer not found".into(),
        });
        assert_eq!(
            err.to_string(),
            "Indexer trigger error: Indexer run rejected with HTTP 404: indexer not found"
        );
    }

    #[test]
    fn test_error_display_chat() {
        let err = GroundedError::Chat(ChatError::ApiRequest {
            message: "connection refused".into(),
        });
        assert_eq!(
            err.to_string(),
            "Chat error: API request failed: connection refused"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GroundedError = io_err.into();
        assert!(matches!(err, GroundedError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GroundedError = serde_err.into();
        assert!(matches!(err, GroundedError::Serialization(_)));
    }

    #[test]
    fn test_chat_error_variants() {
        let err = ChatError::AuthFailed {
            provider: "Azure OpenAI".into(),
        };
        assert_eq!(err.to_string(), "Authentication failed for Azure OpenAI");

        let err = ChatError::RateLimited {
            retry_after_secs: 60,
        };
        assert_eq!(err.to_string(), "Rate limited by provider, retry after 60s");
    }
}
