//! Catalog source trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::Product;

use crate::error::{Result, StorefrontError};

/// Supplies the product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches every product, in display order.
    async fn fetch_catalog(&self) -> Result<Vec<Product>>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<Product>,
    fetches: usize,
    fail_on_fetch: bool,
}

/// In-memory catalog source for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogSource {
    /// Creates a source serving `products`.
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCatalogState {
                products,
                ..InMemoryCatalogState::default()
            })),
        }
    }

    /// Replaces the served products.
    pub fn set_products(&self, products: Vec<Product>) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products = products;
    }

    /// Configures the source to fail on fetch.
    pub fn set_fail_on_fetch(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_fetch = fail;
    }

    /// Returns the number of fetch calls so far.
    pub fn fetch_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fetches
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn fetch_catalog(&self) -> Result<Vec<Product>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.fetches += 1;

        if state.fail_on_fetch {
            return Err(StorefrontError::CatalogService(
                "Catalog unavailable".to_string(),
            ));
        }

        Ok(state.products.clone())
    }
}
