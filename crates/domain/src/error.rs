//! Domain error types.

use event_bus::EventBusError;
use thiserror::Error;

use crate::checkout::{CheckoutPhase, OrderField};

/// Errors that can occur during domain operations.
///
/// Form validation failures are not errors: they are reported through
/// [`FormErrors`](crate::FormErrors) and the `*Errors:change` events.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A field name did not match any order field.
    #[error("Unknown order field: {0}")]
    UnknownField(String),

    /// A field was written through the wrong checkout form.
    #[error("Field '{field}' does not belong to the {phase} form")]
    WrongPhase {
        field: OrderField,
        phase: CheckoutPhase,
    },

    /// A data patch was not a JSON object.
    #[error("Data patch must be a JSON object, got {0}")]
    PatchNotObject(&'static str),

    /// A data patch did not fit the model's shape.
    #[error("Invalid data patch: {0}")]
    Patch(#[from] serde_json::Error),

    /// An error occurred on the event bus.
    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),
}
