//! Catalog products.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Label shown for a product that is not for sale.
pub const PRICELESS_LABEL: &str = "Priceless";

/// One product record as served by the catalog service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Unique, stable product identifier.
    pub id: ProductId,

    /// Long description shown in the preview.
    pub description: String,

    /// Image URL or path.
    pub image: String,

    /// Display title.
    pub title: String,

    /// Category label (e.g. "soft skill").
    pub category: String,

    /// Price, or `None` when the product is not for sale.
    ///
    /// `None` is distinct from a zero price.
    pub price: Option<Money>,
}

impl Product {
    /// Creates a product with the given id, title and price.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Option<Money>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            ..Self::default()
        }
    }

    /// Returns true if the product has a price.
    pub fn is_for_sale(&self) -> bool {
        self.price.is_some()
    }

    /// Returns the price as it is shown on a card.
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => price.to_string(),
            None => PRICELESS_LABEL.to_string(),
        }
    }
}

/// A catalog product bound to the application's event bus.
pub type CatalogItem = Model<Product>;
