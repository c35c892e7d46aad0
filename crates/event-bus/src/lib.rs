//! Synchronous publish-subscribe bus for the storefront.
//!
//! This crate provides:
//! - [`EventBus`]: a shared, cloneable bus with synchronous, ordered delivery
//! - [`Topic`]: exact-name, pattern and catch-all subscription keys
//! - [`Event`]: the envelope handed to subscribers

pub mod bus;
pub mod error;
pub mod event;
pub mod topic;

pub use bus::{EventBus, Handler};
pub use error::{EventBusError, Result};
pub use event::Event;
pub use topic::Topic;
