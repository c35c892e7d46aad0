//! Order sink trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::{Money, OrderDraft, ProductId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StorefrontError};

/// Body of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub payment: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub total: Money,
    pub items: Vec<ProductId>,
}

impl From<OrderDraft> for OrderRequest {
    fn from(draft: OrderDraft) -> Self {
        Self {
            payment: draft.payment,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            total: draft.total,
            items: draft.items,
        }
    }
}

/// Acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Id assigned by the store.
    pub id: String,
    /// Total the store charged.
    pub total: Money,
}

/// Accepts completed orders.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Submits an order, returning the store's confirmation.
    async fn submit_order(&self, order: OrderRequest) -> Result<OrderConfirmation>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: Vec<(String, OrderRequest)>,
    fail_on_submit: bool,
}

/// In-memory order sink for testing.
///
/// Rejects orders without items, like the real store does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderSink {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sink to fail on submit.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_submit = fail;
    }

    /// Returns the number of accepted orders.
    pub fn order_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .len()
    }

    /// Returns the accepted order with the given id.
    pub fn order(&self, id: &str) -> Option<OrderRequest> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .iter()
            .find(|(order_id, _)| order_id == id)
            .map(|(_, order)| order.clone())
    }
}

#[async_trait]
impl OrderSink for InMemoryOrderSink {
    async fn submit_order(&self, order: OrderRequest) -> Result<OrderConfirmation> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_submit {
            return Err(StorefrontError::OrderService(
                "Order service unavailable".to_string(),
            ));
        }
        if order.items.is_empty() {
            return Err(StorefrontError::Rejected("No items in order".to_string()));
        }

        let confirmation = OrderConfirmation {
            id: Uuid::new_v4().to_string(),
            total: order.total,
        };
        state.orders.push((confirmation.id.clone(), order));

        Ok(confirmation)
    }
}
