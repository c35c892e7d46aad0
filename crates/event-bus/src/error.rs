use thiserror::Error;

/// Errors that can occur when subscribing to or emitting on the event bus.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// A subscription pattern is not a valid regular expression.
    #[error("Invalid subscription pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An event payload could not be serialized.
    #[error("Failed to encode payload for event '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// An event payload did not have the shape the handler expected.
    #[error("Failed to decode payload of event '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, EventBusError>;
