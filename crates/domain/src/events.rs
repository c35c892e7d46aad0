//! Names and payloads of the events the application state announces.
//!
//! | Name | Payload |
//! |---|---|
//! | [`CATALOG_CHANGED`] | [`CatalogChanged`] |
//! | [`BASKET_CHANGED`] | array of basket products |
//! | [`PREVIEW_CHANGED`] | the previewed product |
//! | [`DELIVERY_ERRORS_CHANGED`] | [`FormErrors`](crate::FormErrors) |
//! | [`CONTACT_ERRORS_CHANGED`] | [`FormErrors`](crate::FormErrors) |
//! | [`DELIVERY_READY`] | [`OrderDraft`](crate::OrderDraft) |
//! | [`CONTACTS_READY`] | [`OrderDraft`](crate::OrderDraft) |

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// The catalog was replaced.
pub const CATALOG_CHANGED: &str = "items:changed";

/// An entry was added to or removed from the basket.
pub const BASKET_CHANGED: &str = "basket:change";

/// A product was selected for preview.
pub const PREVIEW_CHANGED: &str = "preview:changed";

/// The delivery form was validated.
pub const DELIVERY_ERRORS_CHANGED: &str = "deliveryErrors:change";

/// The contacts form was validated.
pub const CONTACT_ERRORS_CHANGED: &str = "contactsErrors:change";

/// A delivery field write left the delivery form valid.
pub const DELIVERY_READY: &str = "delivery:ready";

/// A contact field write left the contacts form valid.
pub const CONTACTS_READY: &str = "contacts:ready";

/// Payload of [`CATALOG_CHANGED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogChanged {
    /// The new catalog, in service order.
    pub catalog: Vec<Product>,
}
