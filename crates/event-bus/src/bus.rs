use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{Event, EventBusError, Result, Topic};

/// A subscriber callback.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Subscription {
    topic: Topic,
    handler: Handler,
}

/// Synchronous publish-subscribe bus.
///
/// Handlers run on the emitting thread, in registration order, before
/// `emit` returns. The subscription list is not locked while handlers run,
/// so a handler may emit or subscribe on the same bus. Subscriptions added
/// during an emission only see later emissions.
///
/// Cloning the bus yields another handle to the same subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for emissions matching `topic`.
    ///
    /// A plain string subscribes to that exact name; a [`Topic::Pattern`]
    /// subscribes to every name the expression matches.
    pub fn subscribe<F>(&self, topic: impl Into<Topic>, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let topic = topic.into();
        debug!(%topic, "EventBus::subscribe");
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                topic,
                handler: Arc::new(handler),
            });
    }

    /// Registers `handler` for every emission, whatever its name.
    pub fn subscribe_all<F>(&self, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe(Topic::Any, handler);
    }

    /// Serializes `payload` and delivers it to every matching subscriber.
    pub fn emit<T: Serialize + ?Sized>(&self, name: &str, payload: &T) -> Result<()> {
        let payload = serde_json::to_value(payload).map_err(|source| EventBusError::Encode {
            name: name.to_string(),
            source,
        })?;
        self.emit_value(name, payload);
        Ok(())
    }

    /// Delivers a raw JSON payload to every matching subscriber.
    ///
    /// A `null` payload is delivered as an empty object.
    pub fn emit_value(&self, name: &str, payload: Value) {
        self.dispatch(Event::new(name, payload));
    }

    /// Emits `name` with an empty payload.
    pub fn notify(&self, name: &str) {
        self.dispatch(Event::empty(name));
    }

    /// Returns the number of registered subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn dispatch(&self, event: Event) {
        let handlers = self.matching_handlers(&event.name);
        debug!(
            event = %event.name,
            handlers = handlers.len(),
            "EventBus::emit"
        );
        metrics::counter!("event_bus_emissions_total").increment(1);

        for handler in handlers {
            handler(&event);
        }
    }

    // Snapshot under the read lock so handlers run unlocked.
    fn matching_handlers(&self, name: &str) -> Vec<Handler> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|subscription| subscription.topic.matches(name))
            .map(|subscription| Arc::clone(&subscription.handler))
            .collect()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
