//! Application state aggregate.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common::{Money, ProductId};
use event_bus::EventBus;
use tracing::debug;

use crate::catalog::{CatalogItem, Product};
use crate::checkout::{
    CheckoutPhase, ContactField, DeliveryField, FormErrors, OrderDraft, OrderField,
    ValidationState,
};
use crate::events::{self, CatalogChanged};
use crate::model::{Model, ReactiveEntity};

#[derive(Debug, Default)]
struct Inner {
    catalog: Vec<Arc<CatalogItem>>,
    basket: Vec<Arc<CatalogItem>>,
    order: OrderDraft,
    preview: Option<ProductId>,
    form_errors: FormErrors,
}

impl Inner {
    fn basket_products(&self) -> Vec<Product> {
        self.basket.iter().map(|item| item.data().clone()).collect()
    }

    fn total(&self) -> Money {
        self.basket.iter().filter_map(|item| item.price).sum()
    }
}

/// Aggregate root of a storefront session.
///
/// Owns the catalog, the basket, the order draft, the form error set and the
/// preview selection, and announces every change on the shared [`EventBus`].
///
/// The internal lock is never held while announcing, so subscribers can
/// query the state (or call back into it) from their handlers.
#[derive(Debug)]
pub struct AppState {
    events: EventBus,
    inner: RwLock<Inner>,
}

impl ReactiveEntity for AppState {
    fn events(&self) -> &EventBus {
        &self.events
    }
}

impl AppState {
    /// Creates an empty state announcing on `events`.
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// Query methods
impl AppState {
    /// Returns the catalog, in service order.
    pub fn catalog(&self) -> Vec<Arc<CatalogItem>> {
        self.read().catalog.clone()
    }

    /// Looks up a catalog item by id.
    pub fn find_item(&self, id: &ProductId) -> Option<Arc<CatalogItem>> {
        self.read()
            .catalog
            .iter()
            .find(|item| item.id == *id)
            .cloned()
    }

    /// Returns the basket entries, in insertion order.
    pub fn basket(&self) -> Vec<Arc<CatalogItem>> {
        self.read().basket.clone()
    }

    /// Returns the number of basket entries.
    pub fn basket_len(&self) -> usize {
        self.read().basket.len()
    }

    /// Returns the first basket entry with the given id.
    pub fn basket_entry(&self, id: &ProductId) -> Option<Arc<CatalogItem>> {
        self.read()
            .basket
            .iter()
            .find(|item| item.id == *id)
            .cloned()
    }

    /// Returns true if a product with this id is in the basket.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.read().basket.iter().any(|item| item.id == *id)
    }

    /// Returns a snapshot of the order draft.
    pub fn order(&self) -> OrderDraft {
        self.read().order.clone()
    }

    /// Returns the error set of the last validation pass.
    pub fn form_errors(&self) -> FormErrors {
        self.read().form_errors.clone()
    }

    /// Returns the id of the previewed product.
    pub fn preview(&self) -> Option<ProductId> {
        self.read().preview.clone()
    }

    /// Returns the previewed product, if it is still in the catalog.
    pub fn preview_item(&self) -> Option<Arc<CatalogItem>> {
        let id = self.preview()?;
        self.find_item(&id)
    }

    /// Sums the prices of the basket entries.
    ///
    /// Entries without a price contribute nothing.
    pub fn total(&self) -> Money {
        self.read().total()
    }
}

// Catalog and basket
impl AppState {
    /// Replaces the catalog and announces [`events::CATALOG_CHANGED`].
    ///
    /// Basket entries from a previous catalog are kept as they are.
    #[tracing::instrument(skip(self, items), fields(count = items.len()))]
    pub fn load_catalog(&self, items: Vec<Product>) {
        let catalog: Vec<Arc<CatalogItem>> = items
            .into_iter()
            .map(|product| Arc::new(Model::new(product, self.events.clone())))
            .collect();
        let payload = CatalogChanged {
            catalog: catalog.iter().map(|item| item.data().clone()).collect(),
        };

        self.write().catalog = catalog;
        self.announce(events::CATALOG_CHANGED, &payload);
    }

    /// Appends `item` to the basket and its id to the order draft.
    ///
    /// The same item may be added any number of times.
    pub fn add_to_basket(&self, item: &Arc<CatalogItem>) {
        let basket = {
            let mut inner = self.write();
            inner.basket.push(Arc::clone(item));
            inner.order.items.push(item.id.clone());
            inner.basket_products()
        };

        debug!(product_id = %item.id, entries = basket.len(), "added to basket");
        metrics::counter!("storefront_basket_additions_total").increment(1);
        self.announce(events::BASKET_CHANGED, &basket);
    }

    /// Removes the first basket entry that is `item` itself.
    ///
    /// Entries are matched by identity, not by id. The first matching id is
    /// dropped from the order draft as well. [`events::BASKET_CHANGED`] is
    /// announced even when nothing matched. Returns whether an entry was
    /// removed.
    pub fn remove_from_basket(&self, item: &Arc<CatalogItem>) -> bool {
        let (removed, basket) = {
            let mut inner = self.write();
            let removed = match inner.basket.iter().position(|entry| Arc::ptr_eq(entry, item)) {
                Some(index) => {
                    inner.basket.remove(index);
                    if let Some(index) = inner.order.items.iter().position(|id| *id == item.id) {
                        inner.order.items.remove(index);
                    }
                    true
                }
                None => false,
            };
            (removed, inner.basket_products())
        };

        debug!(product_id = %item.id, removed, entries = basket.len(), "removed from basket");
        self.announce(events::BASKET_CHANGED, &basket);
        removed
    }

    /// Empties the basket and the draft's item list.
    ///
    /// Announces nothing; the caller's reset flow does.
    pub fn clear_basket(&self) {
        let mut inner = self.write();
        inner.basket.clear();
        inner.order.items.clear();
        debug!("basket cleared");
    }

    /// Records `item` as the previewed product and announces
    /// [`events::PREVIEW_CHANGED`].
    pub fn set_preview(&self, item: &Arc<CatalogItem>) {
        self.write().preview = Some(item.id.clone());
        self.announce(events::PREVIEW_CHANGED, item.data());
    }
}

// Order draft and checkout validation
impl AppState {
    /// Restores the order draft to its empty shape. The basket is untouched.
    pub fn reset_order(&self) {
        self.write().order = OrderDraft::default();
        debug!("order draft reset");
    }

    /// Prepares the draft for the checkout forms.
    ///
    /// Copies the basket total and the basket's ids into the draft, so a
    /// draft reset by a cancelled checkout matches the basket again.
    pub fn begin_checkout(&self) -> OrderDraft {
        let mut inner = self.write();
        let total = inner.total();
        let items = inner.basket.iter().map(|item| item.id.clone()).collect();
        inner.order.total = total;
        inner.order.items = items;
        debug!(%total, "checkout started");
        inner.order.clone()
    }

    /// Writes a delivery field, then validates the delivery form.
    ///
    /// Announces [`events::DELIVERY_READY`] with the draft if the form is
    /// valid afterwards. Returns whether it is.
    pub fn set_delivery_field(&self, field: DeliveryField, value: impl Into<String>) -> bool {
        self.set_field(CheckoutPhase::Delivery, field.into(), value.into())
    }

    /// Validates payment and address.
    ///
    /// Replaces the error set with the delivery errors only and announces
    /// [`events::DELIVERY_ERRORS_CHANGED`]. Returns true if there are none.
    pub fn validate_delivery(&self) -> bool {
        self.validate(CheckoutPhase::Delivery)
    }

    /// Writes a contact field, then validates the contacts form.
    ///
    /// Announces [`events::CONTACTS_READY`] with the draft if the form is
    /// valid afterwards. Returns whether it is.
    pub fn set_contact_field(&self, field: ContactField, value: impl Into<String>) -> bool {
        self.set_field(CheckoutPhase::Contacts, field.into(), value.into())
    }

    /// Validates email and phone.
    ///
    /// Replaces the error set with the contact errors only and announces
    /// [`events::CONTACT_ERRORS_CHANGED`]. Returns true if there are none.
    pub fn validate_contacts(&self) -> bool {
        self.validate(CheckoutPhase::Contacts)
    }

    fn set_field(&self, phase: CheckoutPhase, field: OrderField, value: String) -> bool {
        self.write().order.set(field, value);

        let valid = self.validate(phase);
        if valid {
            let draft = self.order();
            self.announce(phase.ready_event(), &draft);
        }
        valid
    }

    fn validate(&self, phase: CheckoutPhase) -> bool {
        let errors = {
            let mut inner = self.write();
            let errors = phase.validate(&inner.order);
            inner.form_errors = errors.clone();
            errors
        };

        let state = ValidationState::from_errors(&errors);
        debug!(%phase, ?state, errors = errors.len(), "checkout form validated");
        self.announce(phase.errors_event(), &errors);
        state.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::Event;
    use serde_json::json;
    use std::sync::Mutex;

    fn recording_state() -> (AppState, Arc<Mutex<Vec<Event>>>) {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_ref = Arc::clone(&log);
        bus.subscribe_all(move |event: &Event| log_ref.lock().unwrap().push(event.clone()));
        (AppState::new(bus), log)
    }

    fn names(log: &Mutex<Vec<Event>>) -> Vec<String> {
        log.lock().unwrap().iter().map(|e| e.name.clone()).collect()
    }

    fn loaded_state() -> (AppState, Arc<Mutex<Vec<Event>>>) {
        let (state, log) = recording_state();
        state.load_catalog(vec![
            Product::new("a", "Alpha", Some(Money::new(100))),
            Product::new("b", "Beta", Some(Money::new(250))),
            Product::new("c", "Gamma", None),
        ]);
        log.lock().unwrap().clear();
        (state, log)
    }

    fn item(state: &AppState, id: &str) -> Arc<CatalogItem> {
        state.find_item(&ProductId::new(id)).unwrap()
    }

    #[test]
    fn new_state_is_empty() {
        let state = AppState::new(EventBus::new());
        assert!(state.catalog().is_empty());
        assert_eq!(state.basket_len(), 0);
        assert!(state.order().is_empty());
        assert!(state.form_errors().is_empty());
        assert_eq!(state.preview(), None);
        assert!(state.total().is_zero());
    }

    #[test]
    fn load_catalog_announces_new_list() {
        let (state, log) = recording_state();
        state.load_catalog(vec![Product::new("a", "Alpha", Some(Money::new(100)))]);

        assert_eq!(state.catalog().len(), 1);
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].name, events::CATALOG_CHANGED);
        let payload: CatalogChanged = log[0].decode().unwrap();
        assert_eq!(payload.catalog[0].id, ProductId::new("a"));
    }

    #[test]
    fn catalog_items_share_the_state_bus() {
        let (state, log) = loaded_state();
        item(&state, "a").announce_empty("card:select");
        assert_eq!(names(&log), vec!["card:select"]);
    }

    #[test]
    fn reloading_catalog_keeps_dangling_basket_entries() {
        let (state, _) = loaded_state();
        state.add_to_basket(&item(&state, "a"));

        state.load_catalog(vec![Product::new("z", "Zeta", Some(Money::new(5)))]);

        assert_eq!(state.basket_len(), 1);
        assert_eq!(state.total(), Money::new(100));
        assert!(state.find_item(&ProductId::new("a")).is_none());
    }

    #[test]
    fn add_to_basket_appends_and_announces() {
        let (state, log) = loaded_state();
        state.add_to_basket(&item(&state, "a"));
        state.add_to_basket(&item(&state, "b"));

        assert_eq!(state.basket_len(), 2);
        assert_eq!(
            state.order().items,
            vec![ProductId::new("a"), ProductId::new("b")]
        );
        assert_eq!(names(&log), vec![events::BASKET_CHANGED, events::BASKET_CHANGED]);

        let log = log.lock().unwrap();
        let basket: Vec<Product> = log[1].decode().unwrap();
        assert_eq!(basket.len(), 2);
        assert_eq!(basket[1].id, ProductId::new("b"));
    }

    #[test]
    fn same_item_can_be_added_twice() {
        let (state, _) = loaded_state();
        let a = item(&state, "a");
        state.add_to_basket(&a);
        state.add_to_basket(&a);

        assert_eq!(state.basket_len(), 2);
        assert_eq!(state.total(), Money::new(200));
    }

    #[test]
    fn remove_takes_first_identical_entry() {
        let (state, _) = loaded_state();
        let a = item(&state, "a");
        let b = item(&state, "b");
        state.add_to_basket(&a);
        state.add_to_basket(&b);
        state.add_to_basket(&a);

        assert!(state.remove_from_basket(&a));

        let ids: Vec<_> = state.basket().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![ProductId::new("b"), ProductId::new("a")]);
        assert_eq!(state.order().items, ids);
    }

    #[test]
    fn remove_matches_identity_not_id() {
        let (state, _) = loaded_state();
        let original = item(&state, "a");
        state.add_to_basket(&original);

        let lookalike = Arc::new(Model::new(
            Product::new("a", "Alpha", Some(Money::new(100))),
            EventBus::new(),
        ));
        assert!(!state.remove_from_basket(&lookalike));
        assert_eq!(state.basket_len(), 1);
    }

    #[test]
    fn remove_missing_item_still_announces() {
        let (state, log) = loaded_state();
        state.add_to_basket(&item(&state, "a"));
        log.lock().unwrap().clear();

        assert!(!state.remove_from_basket(&item(&state, "b")));

        assert_eq!(state.basket_len(), 1);
        assert_eq!(names(&log), vec![events::BASKET_CHANGED]);
    }

    #[test]
    fn total_counts_missing_price_as_zero() {
        let (state, _) = loaded_state();
        state.add_to_basket(&item(&state, "b"));
        state.add_to_basket(&item(&state, "c"));

        assert_eq!(state.total(), Money::new(250));
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let (state, _) = recording_state();
        state.load_catalog(vec![Product::new("max", "Max", Some(Money::new(i64::MAX)))]);
        let max = item(&state, "max");
        state.add_to_basket(&max);
        state.add_to_basket(&max);

        assert_eq!(state.total(), Money::new(i64::MAX));
        assert_eq!(state.begin_checkout().total, Money::new(i64::MAX));
    }

    #[test]
    fn clear_basket_is_silent() {
        let (state, log) = loaded_state();
        state.add_to_basket(&item(&state, "a"));
        log.lock().unwrap().clear();

        state.clear_basket();

        assert_eq!(state.basket_len(), 0);
        assert!(state.order().items.is_empty());
        assert!(state.total().is_zero());
        assert!(names(&log).is_empty());
    }

    #[test]
    fn reset_order_keeps_basket() {
        let (state, _) = loaded_state();
        state.add_to_basket(&item(&state, "a"));
        state.set_delivery_field(DeliveryField::Payment, "card");

        state.reset_order();

        assert!(state.order().is_empty());
        assert_eq!(state.basket_len(), 1);
    }

    #[test]
    fn begin_checkout_syncs_total_and_items() {
        let (state, _) = loaded_state();
        state.add_to_basket(&item(&state, "a"));
        state.add_to_basket(&item(&state, "b"));
        state.reset_order();

        let draft = state.begin_checkout();

        assert_eq!(draft.total, Money::new(350));
        assert_eq!(draft.items, vec![ProductId::new("a"), ProductId::new("b")]);
        assert_eq!(state.order(), draft);
    }

    #[test]
    fn set_preview_records_id_and_announces_item() {
        let (state, log) = loaded_state();
        state.set_preview(&item(&state, "b"));

        assert_eq!(state.preview(), Some(ProductId::new("b")));
        assert_eq!(state.preview_item().unwrap().title, "Beta");

        let log = log.lock().unwrap();
        assert_eq!(log[0].name, events::PREVIEW_CHANGED);
        assert_eq!(log[0].payload["title"], json!("Beta"));
    }

    #[test]
    fn payment_alone_leaves_delivery_invalid() {
        let (state, log) = recording_state();

        assert!(!state.set_delivery_field(DeliveryField::Payment, "card"));

        let errors = state.form_errors();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![OrderField::Address]);
        assert_eq!(names(&log), vec![events::DELIVERY_ERRORS_CHANGED]);
    }

    #[test]
    fn completing_delivery_emits_one_ready_event() {
        let (state, log) = recording_state();
        state.set_delivery_field(DeliveryField::Payment, "card");
        assert!(state.set_delivery_field(DeliveryField::Address, "Main St"));

        assert!(state.form_errors().is_empty());
        assert_eq!(
            names(&log),
            vec![
                events::DELIVERY_ERRORS_CHANGED,
                events::DELIVERY_ERRORS_CHANGED,
                events::DELIVERY_READY
            ]
        );

        let log = log.lock().unwrap();
        let draft: OrderDraft = log[2].decode().unwrap();
        assert_eq!(draft.payment, "card");
        assert_eq!(draft.address, "Main St");
    }

    #[test]
    fn clearing_a_field_makes_phase_invalid_again() {
        let (state, _) = recording_state();
        state.set_delivery_field(DeliveryField::Payment, "card");
        state.set_delivery_field(DeliveryField::Address, "Main St");

        assert!(!state.set_delivery_field(DeliveryField::Address, ""));
        assert!(state.form_errors().contains(OrderField::Address));
    }

    #[test]
    fn contact_writes_do_not_validate_delivery() {
        let (state, log) = recording_state();
        state.set_contact_field(ContactField::Email, "user@example.com");

        assert_eq!(names(&log), vec![events::CONTACT_ERRORS_CHANGED]);
        let errors = state.form_errors();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![OrderField::Phone]);
    }

    #[test]
    fn contacts_ready_after_both_fields() {
        let (state, log) = recording_state();
        state.set_contact_field(ContactField::Email, "user@example.com");
        assert!(state.set_contact_field(ContactField::Phone, "+71234567890"));

        let ready: Vec<_> = names(&log)
            .into_iter()
            .filter(|name| name == events::CONTACTS_READY)
            .collect();
        assert_eq!(ready.len(), 1);
        assert!(state.validate_contacts());
    }

    #[test]
    fn validation_replaces_error_set_wholesale() {
        let (state, _) = recording_state();
        assert!(!state.validate_delivery());
        assert_eq!(state.form_errors().len(), 2);

        assert!(!state.validate_contacts());
        let fields: Vec<_> = state.form_errors().fields().collect();
        assert_eq!(fields, vec![OrderField::Email, OrderField::Phone]);
    }

    #[test]
    fn handlers_can_query_state_during_announcement() {
        let bus = EventBus::new();
        let state = Arc::new(AppState::new(bus.clone()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let state_ref = Arc::clone(&state);
        let seen_ref = Arc::clone(&seen);
        bus.subscribe(events::BASKET_CHANGED, move |_: &Event| {
            seen_ref
                .lock()
                .unwrap()
                .push((state_ref.basket_len(), state_ref.total()));
        });

        state.load_catalog(vec![Product::new("a", "Alpha", Some(Money::new(100)))]);
        let a = state.find_item(&ProductId::new("a")).unwrap();
        state.add_to_basket(&a);
        state.add_to_basket(&a);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(1, Money::new(100)), (2, Money::new(200))]
        );
    }
}
