use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{EventBusError, Result};

/// A named notification delivered to subscribers.
///
/// The payload is always a JSON value. An emission without a payload carries
/// an empty object, so handlers never see `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The event name the emitter used (e.g. `"basket:change"`).
    pub name: String,

    /// The event payload.
    pub payload: Value,

    /// When the event was emitted.
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    /// Creates an event, substituting an empty object for a `null` payload.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        let payload = match payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        Self {
            name: name.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// Creates an event with an empty payload.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }

    /// Deserializes the payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.payload).map_err(|source| EventBusError::Decode {
            name: self.name.clone(),
            source,
        })
    }

    /// Returns true if the payload is an empty object.
    pub fn is_empty(&self) -> bool {
        matches!(&self.payload, Value::Object(map) if map.is_empty())
    }
}
