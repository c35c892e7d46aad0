//! Value objects shared by every crate in the storefront workspace.

mod types;

pub use types::{Money, ProductId};
