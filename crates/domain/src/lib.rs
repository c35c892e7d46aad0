//! Domain layer for the storefront.
//!
//! This crate provides the reactive state core:
//! - [`ReactiveEntity`] trait and [`Model`] base for change-announcing data
//! - [`CatalogItem`] products bound to the shared event bus
//! - [`AppState`] aggregate owning catalog, basket, order draft and
//!   the two-phase checkout validation
//! - [`events`] names and payloads announced by the aggregate

pub mod app_state;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod events;
pub mod model;

pub use app_state::AppState;
pub use catalog::{CatalogItem, PRICELESS_LABEL, Product};
pub use checkout::{
    CheckoutPhase, ContactField, DeliveryField, FormErrors, OrderDraft, OrderField,
    ValidationState,
};
pub use common::{Money, ProductId};
pub use error::DomainError;
pub use model::{Model, ReactiveEntity};
