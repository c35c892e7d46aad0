//! Collaborators a storefront session talks to, with in-memory
//! implementations for tests.

pub mod catalog;
pub mod http;
pub mod orders;

pub use catalog::{CatalogSource, InMemoryCatalogSource};
pub use http::HttpStoreApi;
pub use orders::{InMemoryOrderSink, OrderConfirmation, OrderRequest, OrderSink};
