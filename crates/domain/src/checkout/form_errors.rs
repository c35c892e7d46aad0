use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::OrderField;

/// Validation messages keyed by order field.
///
/// Serializes as a JSON object, e.g. `{"address": "Enter a delivery address"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<OrderField, String>);

impl FormErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, replacing any previous one.
    pub fn insert(&mut self, field: OrderField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Returns the message for `field`, if any.
    pub fn get(&self, field: OrderField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Returns true if `field` has an error.
    pub fn contains(&self, field: OrderField) -> bool {
        self.0.contains_key(&field)
    }

    /// Returns true if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the fields with errors, in form order.
    pub fn fields(&self) -> impl Iterator<Item = OrderField> + '_ {
        self.0.keys().copied()
    }

    /// Iterates over `(field, message)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (OrderField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Joins every message into the single line a form displays.
    pub fn summary(&self) -> String {
        self.0.values().map(String::as_str).collect::<Vec<_>>().join("; ")
    }
}

impl FromIterator<(OrderField, String)> for FormErrors {
    fn from_iter<I: IntoIterator<Item = (OrderField, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
