//! Storefront error types.

use domain::DomainError;
use event_bus::EventBusError;
use thiserror::Error;

/// Errors that can occur at the storefront's I/O boundary.
///
/// None of these are fatal to a session: the caller logs or shows the
/// message and the user retries.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The HTTP request could not be completed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store service answered with an error message.
    #[error("Request rejected by the store: {0}")]
    Rejected(String),

    /// The store service answered with an unexpected status.
    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Catalog source error.
    #[error("Catalog service error: {0}")]
    CatalogService(String),

    /// Order sink error.
    #[error("Order service error: {0}")]
    OrderService(String),

    /// Another submission has not resolved yet.
    #[error("An order submission is already in flight")]
    SubmissionInFlight,

    /// The order draft cannot be submitted yet.
    #[error("Order not ready: {0}")]
    NotReady(String),

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Event bus error.
    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for storefront results.
pub type Result<T> = std::result::Result<T, StorefrontError>;
