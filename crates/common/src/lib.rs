//! Shared types, config, collaborator traits, and error definitions for the
//! league notifier.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::NotifierConfig;
pub use error::{format_error_chain, Error};
pub use traits::{ChatSink, KeyValueStore, LeagueSource, MessageQueue, QueuedMessage, Record};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
