//! UI intents and their routing onto the application state.
//!
//! Views emit intents on the shared bus; [`wire`] subscribes the handlers
//! that turn them into [`AppState`] commands. Intents naming an unknown
//! product or carrying a malformed payload are logged and ignored.

use std::str::FromStr;
use std::sync::{Arc, Weak};

use domain::{AppState, CatalogItem, ContactField, DeliveryField, ProductId};
use event_bus::{Event, EventBus, Topic};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// A catalog card was clicked. Payload: [`ProductRef`].
pub const CARD_SELECT: &str = "card:select";

/// "Add to basket" was pressed. Payload: [`ProductRef`].
pub const PRODUCT_ADD: &str = "product:add";

/// A basket entry was deleted. Payload: [`ProductRef`].
pub const PRODUCT_DELETE: &str = "product:delete";

/// The basket's checkout button was pressed. No payload.
pub const DELIVERY_OPEN: &str = "delivery:open";

/// Matches `order.<field>:change`. Payload: [`FieldChange`].
pub const DELIVERY_FIELD_CHANGE: &str = r"^order\..+:change$";

/// Matches `contacts.<field>:change`. Payload: [`FieldChange`].
pub const CONTACT_FIELD_CHANGE: &str = r"^contacts\..+:change$";

/// The contacts form was submitted. No payload.
pub const ORDER_SUBMIT: &str = "contacts:submit";

/// An order was accepted by the store. Payload: the confirmation.
pub const ORDER_PLACED: &str = "order:placed";

/// An order submission failed. Payload: [`OrderFailed`].
pub const ORDER_FAILED: &str = "order:failed";

/// Payload naming a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
}

/// Payload of [`ORDER_FAILED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailed {
    pub error: String,
}

/// Payload of a form input change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub value: String,
}

/// Subscribes the intent handlers on `bus`.
///
/// Handlers hold a weak reference to `state`, so wiring does not keep the
/// state alive; intents arriving after it is dropped are ignored.
pub fn wire(bus: &EventBus, state: &Arc<AppState>) -> Result<()> {
    on(bus, CARD_SELECT, state, |state, event| {
        if let Some(item) = resolve(state, event, |state, id| state.find_item(id)) {
            state.set_preview(&item);
        }
    });

    on(bus, PRODUCT_ADD, state, |state, event| {
        if let Some(item) = resolve(state, event, |state, id| state.find_item(id)) {
            state.add_to_basket(&item);
        }
    });

    // A catalog product that is not in the basket still goes through
    // removal, which announces the unchanged basket.
    on(bus, PRODUCT_DELETE, state, |state, event| {
        let lookup = |state: &AppState, id: &ProductId| {
            state.basket_entry(id).or_else(|| state.find_item(id))
        };
        if let Some(item) = resolve(state, event, lookup) {
            state.remove_from_basket(&item);
        }
    });

    on(bus, DELIVERY_OPEN, state, |state, _| {
        state.begin_checkout();
    });

    on(bus, Topic::pattern(DELIVERY_FIELD_CHANGE)?, state, |state, event| {
        if let Some((field, value)) = field_change::<DeliveryField>(event) {
            state.set_delivery_field(field, value);
        }
    });

    on(bus, Topic::pattern(CONTACT_FIELD_CHANGE)?, state, |state, event| {
        if let Some((field, value)) = field_change::<ContactField>(event) {
            state.set_contact_field(field, value);
        }
    });

    Ok(())
}

fn on<F>(bus: &EventBus, topic: impl Into<Topic>, state: &Arc<AppState>, handler: F)
where
    F: Fn(&AppState, &Event) + Send + Sync + 'static,
{
    let state: Weak<AppState> = Arc::downgrade(state);
    bus.subscribe(topic, move |event: &Event| match state.upgrade() {
        Some(state) => handler(&state, event),
        None => debug!(event = %event.name, "intent after state was dropped"),
    });
}

fn resolve<F>(state: &AppState, event: &Event, lookup: F) -> Option<Arc<CatalogItem>>
where
    F: FnOnce(&AppState, &ProductId) -> Option<Arc<CatalogItem>>,
{
    let product = match event.decode::<ProductRef>() {
        Ok(product) => product,
        Err(err) => {
            warn!(event = %event.name, error = %err, "malformed product intent");
            return None;
        }
    };

    let item = lookup(state, &product.id);
    if item.is_none() {
        warn!(event = %event.name, product_id = %product.id, "intent names an unknown product");
    }
    item
}

fn field_change<F>(event: &Event) -> Option<(F, String)>
where
    F: FromStr,
    F::Err: std::fmt::Display,
{
    let change = match event.decode::<FieldChange>() {
        Ok(change) => change,
        Err(err) => {
            warn!(event = %event.name, error = %err, "malformed field change");
            return None;
        }
    };

    match change.field.parse::<F>() {
        Ok(field) => Some((field, change.value)),
        Err(err) => {
            warn!(event = %event.name, error = %err, "field change rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, Product, events};
    use serde_json::json;
    use std::sync::Mutex;

    fn wired() -> (EventBus, Arc<AppState>) {
        let bus = EventBus::new();
        let state = Arc::new(AppState::new(bus.clone()));
        state.load_catalog(vec![
            Product::new("p1", "Alpha", Some(Money::new(100))),
            Product::new("p2", "Beta", None),
        ]);
        wire(&bus, &state).unwrap();
        (bus, state)
    }

    #[test]
    fn test_card_select_sets_preview() {
        let (bus, state) = wired();

        bus.emit(CARD_SELECT, &json!({ "id": "p2" })).unwrap();

        assert_eq!(state.preview(), Some(ProductId::new("p2")));
    }

    #[test]
    fn test_product_add_and_delete() {
        let (bus, state) = wired();

        bus.emit(PRODUCT_ADD, &json!({ "id": "p1" })).unwrap();
        bus.emit(PRODUCT_ADD, &json!({ "id": "p1" })).unwrap();
        assert_eq!(state.basket_len(), 2);
        assert_eq!(state.total(), Money::new(200));

        bus.emit(PRODUCT_DELETE, &json!({ "id": "p1" })).unwrap();
        assert_eq!(state.basket_len(), 1);
        assert_eq!(state.order().items, vec![ProductId::new("p1")]);
    }

    fn count_basket_events(bus: &EventBus) -> Arc<Mutex<usize>> {
        let basket_events = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&basket_events);
        bus.subscribe(events::BASKET_CHANGED, move |_: &Event| {
            *counter.lock().unwrap() += 1;
        });
        basket_events
    }

    #[test]
    fn test_unknown_product_is_ignored() {
        let (bus, state) = wired();
        let basket_events = count_basket_events(&bus);

        bus.emit(PRODUCT_ADD, &json!({ "id": "missing" })).unwrap();
        bus.emit(PRODUCT_DELETE, &json!({ "id": "missing" })).unwrap();

        assert_eq!(state.basket_len(), 0);
        assert_eq!(*basket_events.lock().unwrap(), 0);
    }

    #[test]
    fn test_delete_of_product_not_in_basket_still_announces() {
        let (bus, state) = wired();
        state.add_to_basket(&state.find_item(&ProductId::new("p2")).unwrap());
        let basket_events = count_basket_events(&bus);

        bus.emit(PRODUCT_DELETE, &json!({ "id": "p1" })).unwrap();

        assert_eq!(state.basket_len(), 1);
        assert_eq!(state.order().items, vec![ProductId::new("p2")]);
        assert_eq!(*basket_events.lock().unwrap(), 1);
    }

    #[test]
    fn test_wiring_does_not_keep_state_alive() {
        let (bus, state) = wired();
        let weak = Arc::downgrade(&state);

        drop(state);

        assert!(weak.upgrade().is_none());
        bus.emit(PRODUCT_ADD, &json!({ "id": "p1" })).unwrap();
        bus.notify(DELIVERY_OPEN);
    }

    #[test]
    fn test_malformed_payload_is_ignored() {
        let (bus, state) = wired();

        bus.emit(PRODUCT_ADD, &json!({ "product": "p1" })).unwrap();
        bus.notify(CARD_SELECT);

        assert_eq!(state.basket_len(), 0);
        assert_eq!(state.preview(), None);
    }

    #[test]
    fn test_delivery_open_syncs_draft() {
        let (bus, state) = wired();
        bus.emit(PRODUCT_ADD, &json!({ "id": "p1" })).unwrap();
        state.reset_order();

        bus.notify(DELIVERY_OPEN);

        let draft = state.order();
        assert_eq!(draft.total, Money::new(100));
        assert_eq!(draft.items, vec![ProductId::new("p1")]);
    }

    #[test]
    fn test_field_changes_route_by_form() {
        let (bus, state) = wired();

        bus.emit("order.address:change", &json!({ "field": "address", "value": "Main St" }))
            .unwrap();
        bus.emit("contacts.email:change", &json!({ "field": "email", "value": "a@b.c" }))
            .unwrap();

        let draft = state.order();
        assert_eq!(draft.address, "Main St");
        assert_eq!(draft.email, "a@b.c");
    }

    #[test]
    fn test_field_from_other_form_is_rejected() {
        let (bus, state) = wired();

        bus.emit("order.email:change", &json!({ "field": "email", "value": "a@b.c" }))
            .unwrap();
        bus.emit("contacts.payment:change", &json!({ "field": "payment", "value": "card" }))
            .unwrap();

        assert!(state.order().is_empty());
    }
}
