//! Unified error type for the league notifier.

use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("MFL API error (status={status}): {message}")]
    Mfl { status: u16, message: String },

    #[error("GroupMe API error: {0}")]
    GroupMe(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("No {kind} found for id {id:?}")]
    Lookup { kind: &'static str, id: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn player_lookup(id: impl Into<String>) -> Self {
        Self::Lookup {
            kind: "player",
            id: id.into(),
        }
    }

    pub fn franchise_lookup(id: impl Into<String>) -> Self {
        Self::Lookup {
            kind: "franchise",
            id: id.into(),
        }
    }

    /// Network, store, and queue failures. A later invocation may succeed
    /// without any change to the data.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Mfl { .. }
                | Self::GroupMe(_)
                | Self::Store(_)
                | Self::Queue(_)
                | Self::Io(_)
        )
    }
}

/// Render an error with its chained causes so network failures (DNS, TLS,
/// socket) stay visible. Causes already contained in the message are skipped.
pub fn format_error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_malformed_are_fatal() {
        assert!(!Error::player_lookup("11247").is_transient());
        assert!(!Error::MalformedInput("bad".into()).is_transient());
        assert!(Error::Store("locked".into()).is_transient());
        assert!(Error::Mfl {
            status: 503,
            message: "busy".into()
        }
        .is_transient());
    }

    #[test]
    fn test_lookup_message_names_the_id() {
        let msg = Error::franchise_lookup("0003").to_string();
        assert_eq!(msg, "No franchise found for id \"0003\"");
    }

    #[derive(Debug, thiserror::Error)]
    #[error("{msg}")]
    struct Layer {
        msg: &'static str,
        #[source]
        cause: Option<Box<Layer>>,
    }

    #[test]
    fn test_error_chain_appends_new_causes_only() {
        let err = Layer {
            msg: "error sending request: connection refused",
            cause: Some(Box::new(Layer {
                msg: "connection refused",
                cause: Some(Box::new(Layer {
                    msg: "dns error",
                    cause: None,
                })),
            })),
        };
        assert_eq!(
            format_error_chain(&err),
            "error sending request: connection refused: dns error"
        );
    }
}
