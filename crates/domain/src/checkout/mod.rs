//! Order draft, form fields and checkout validation.

mod draft;
mod fields;
mod form_errors;
mod phase;

pub use draft::OrderDraft;
pub use fields::{ContactField, DeliveryField, OrderField};
pub use form_errors::FormErrors;
pub use phase::{CheckoutPhase, ValidationState};
