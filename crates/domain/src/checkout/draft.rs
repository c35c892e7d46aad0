use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use super::OrderField;

/// The in-progress checkout record.
///
/// Text fields use the empty string for "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub payment: String,
    pub address: String,
    pub email: String,
    pub phone: String,

    /// Ids of the basket entries, one per entry.
    pub items: Vec<ProductId>,

    /// Order total, filled in when checkout begins.
    pub total: Money,
}

impl OrderDraft {
    /// Returns the current value of a form field.
    pub fn get(&self, field: OrderField) -> &str {
        match field {
            OrderField::Payment => &self.payment,
            OrderField::Address => &self.address,
            OrderField::Email => &self.email,
            OrderField::Phone => &self.phone,
        }
    }

    /// Overwrites a form field.
    pub fn set(&mut self, field: OrderField, value: String) {
        match field {
            OrderField::Payment => self.payment = value,
            OrderField::Address => self.address = value,
            OrderField::Email => self.email = value,
            OrderField::Phone => self.phone = value,
        }
    }

    /// Returns true if the field has a value.
    pub fn is_set(&self, field: OrderField) -> bool {
        !self.get(field).is_empty()
    }

    /// Returns true if the draft is in its initial shape.
    pub fn is_empty(&self) -> bool {
        *self == OrderDraft::default()
    }
}
