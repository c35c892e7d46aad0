//! Change-announcing model base.

use event_bus::EventBus;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::DomainError;

/// Trait for domain objects that announce their own changes.
///
/// Announcing is always an explicit call made after a mutation. Nothing
/// watches field writes, so a caller decides exactly which events fire.
pub trait ReactiveEntity {
    /// Returns the bus this entity announces on.
    fn events(&self) -> &EventBus;

    /// Emits `name` with `payload` on the entity's bus.
    ///
    /// A payload that fails to serialize is logged and dropped; announcing
    /// never fails the mutation that preceded it.
    fn announce<P: Serialize + ?Sized>(&self, name: &str, payload: &P) {
        if let Err(err) = self.events().emit(name, payload) {
            tracing::warn!(error = %err, event = name, "failed to announce change");
        }
    }

    /// Emits `name` with an empty payload.
    fn announce_empty(&self, name: &str) {
        self.events().notify(name);
    }
}

/// A data record bound to a shared event bus.
///
/// `Model` dereferences to its data, serializes as its data, and can be
/// seeded or patched from a partial JSON object.
#[derive(Debug, Clone)]
pub struct Model<T> {
    data: T,
    events: EventBus,
}

impl<T> Model<T> {
    /// Wraps `data`, sharing `events` with the rest of the application.
    pub fn new(data: T, events: EventBus) -> Self {
        Self { data, events }
    }

    /// Returns the wrapped data.
    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T> Model<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Creates a model from a partial JSON object.
    ///
    /// Keys missing from `partial` keep the data type's defaults.
    pub fn from_partial(partial: Value, events: EventBus) -> Result<Self, DomainError> {
        let mut model = Self::new(T::default(), events);
        model.patch(partial)?;
        Ok(model)
    }

    /// Overwrites the top-level fields present in `patch`.
    ///
    /// Nested objects are replaced, not merged. On error the data is left
    /// unchanged.
    pub fn patch(&mut self, patch: Value) -> Result<(), DomainError> {
        let fields = match patch {
            Value::Object(fields) => fields,
            other => return Err(DomainError::PatchNotObject(json_kind(&other))),
        };

        let mut current = serde_json::to_value(&self.data)?;
        if let Value::Object(target) = &mut current {
            target.extend(fields);
        }
        self.data = serde_json::from_value(current)?;
        Ok(())
    }
}

impl<T> ReactiveEntity for Model<T> {
    fn events(&self) -> &EventBus {
        &self.events
    }
}

impl<T> std::ops::Deref for Model<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T: Serialize> Serialize for Model<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
