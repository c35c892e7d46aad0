//! Storefront session layer.
//!
//! Connects the reactive state core to the outside world:
//! - [`services`]: catalog source and order sink, over HTTP or in memory
//! - [`intents`]: UI intent names and their routing onto the state
//! - [`Storefront`]: a session tying the bus, state and services together

pub mod config;
pub mod error;
pub mod intents;
pub mod services;
pub mod session;

pub use config::Config;
pub use error::{Result, StorefrontError};
pub use intents::{FieldChange, OrderFailed, ProductRef};
pub use services::{
    CatalogSource, HttpStoreApi, InMemoryCatalogSource, InMemoryOrderSink, OrderConfirmation,
    OrderRequest, OrderSink,
};
pub use session::Storefront;
