//! # Grounded Core
//!
//! Core library for the grounded RAG demo.
//! Provides configuration, the indexer trigger client, the grounded
//! chat-completion client, and fundamental types.

pub mod chat;
pub mod config;
pub mod error;
pub mod indexer;
pub mod types;

// Re-export commonly used types at the crate root.
pub use chat::ChatClient;
pub use config::{AppConfig, IndexerConfig, OpenAiConfig, SearchConfig};
pub use error::{ChatError, ConfigError, GroundedError, Result, TriggerError};
pub use indexer::IndexerClient;
pub use types::{Answer, Message, Role};
