//! Storefront session: the application state plus its I/O collaborators.

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use domain::{AppState, CheckoutPhase, Product, ReactiveEntity, events};
use event_bus::{Event, EventBus};
use tracing::{debug, error, info, warn};

use crate::error::{Result, StorefrontError};
use crate::intents::{self, ORDER_FAILED, ORDER_PLACED, ORDER_SUBMIT, OrderFailed};
use crate::services::{CatalogSource, OrderConfirmation, OrderRequest, OrderSink};

/// Drives one storefront session.
///
/// Owns the shared bus and [`AppState`], fetches the catalog from `C` and
/// submits completed orders to `O`. Transport failures are returned to the
/// caller and never written into the state.
pub struct Storefront<C, O>
where
    C: CatalogSource,
    O: OrderSink,
{
    events: EventBus,
    state: Arc<AppState>,
    catalog: C,
    orders: O,
    submitting: AtomicBool,
}

impl<C, O> Storefront<C, O>
where
    C: CatalogSource,
    O: OrderSink,
{
    /// Creates a session with an empty state on `events`.
    pub fn new(events: EventBus, catalog: C, orders: O) -> Self {
        let state = Arc::new(AppState::new(events.clone()));
        Self {
            events,
            state,
            catalog,
            orders,
            submitting: AtomicBool::new(false),
        }
    }

    /// Returns the session's bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the application state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Returns true while an order submission is pending.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Routes UI intents on the bus to the application state.
    pub fn wire(&self) -> Result<()> {
        intents::wire(&self.events, &self.state)
    }

    /// Logs every emission on the bus at trace level.
    pub fn trace_events(&self) {
        self.events.subscribe_all(|event: &Event| {
            tracing::trace!(event = %event.name, payload = %event.payload, "event");
        });
    }

    /// Fetches the catalog and loads it into the state.
    ///
    /// On failure the error is logged and returned, and the current catalog
    /// is kept. Returns the number of products loaded.
    #[tracing::instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<usize> {
        match self.catalog.fetch_catalog().await {
            Ok(products) => {
                let count = products.len();
                self.state.load_catalog(products);
                info!(count, "catalog loaded");
                Ok(count)
            }
            Err(err) => {
                error!(error = %err, "failed to load catalog");
                metrics::counter!("storefront_catalog_failures_total").increment(1);
                Err(err)
            }
        }
    }

    /// Submits the current order.
    ///
    /// The draft is synced with the basket and checked against both forms
    /// first. Only one submission may be pending at a time. On success
    /// [`ORDER_PLACED`] is emitted with the confirmation, then the basket is
    /// cleared, the draft reset and [`events::BASKET_CHANGED`] announced
    /// with the empty basket. On failure the basket and draft are kept.
    #[tracing::instrument(skip(self))]
    pub async fn submit_order(&self) -> Result<OrderConfirmation> {
        let _in_flight = InFlight::acquire(&self.submitting)?;
        metrics::counter!("storefront_order_submissions_total").increment(1);
        let started = std::time::Instant::now();

        let request = self.prepare_order()?;
        let confirmation = match self.orders.submit_order(request).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                error!(error = %err, "order submission failed");
                metrics::counter!("storefront_order_failures_total").increment(1);
                return Err(err);
            }
        };

        self.state.announce(ORDER_PLACED, &confirmation);
        self.complete_order();

        metrics::histogram!("storefront_order_submission_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        info!(order_id = %confirmation.id, total = %confirmation.total, "order placed");
        Ok(confirmation)
    }

    /// Abandons checkout: the draft is reset, the basket kept.
    pub fn cancel_checkout(&self) {
        self.state.reset_order();
        debug!("checkout cancelled");
    }

    fn prepare_order(&self) -> Result<OrderRequest> {
        let draft = self.state.begin_checkout();
        if draft.items.is_empty() {
            return Err(StorefrontError::NotReady("basket is empty".to_string()));
        }

        let mut errors = CheckoutPhase::Delivery.validate(&draft);
        for (field, message) in CheckoutPhase::Contacts.validate(&draft).iter() {
            errors.insert(field, message);
        }
        if !errors.is_empty() {
            return Err(StorefrontError::NotReady(errors.summary()));
        }

        Ok(OrderRequest::from(draft))
    }

    fn complete_order(&self) {
        self.state.clear_basket();
        self.state.reset_order();
        self.state.announce(events::BASKET_CHANGED, &Vec::<Product>::new());
    }
}

impl<C, O> Storefront<C, O>
where
    C: CatalogSource + 'static,
    O: OrderSink + 'static,
{
    /// Submits the order whenever [`ORDER_SUBMIT`] is emitted.
    ///
    /// Each submission is spawned on the tokio runtime of the emitting
    /// thread. A failure is announced as [`ORDER_FAILED`]. The handler holds
    /// a weak reference, so the session can still be dropped.
    pub fn wire_submission(self: &Arc<Self>) {
        let session: Weak<Self> = Arc::downgrade(self);
        self.events.subscribe(ORDER_SUBMIT, move |_: &Event| {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                warn!("order submit intent outside a tokio runtime");
                return;
            };
            let session = Weak::clone(&session);
            runtime.spawn(async move {
                if let Some(session) = session.upgrade() {
                    session.submit_from_intent().await;
                }
            });
        });
    }

    async fn submit_from_intent(&self) {
        if let Err(err) = self.submit_order().await {
            warn!(error = %err, "order submit intent failed");
            self.state.announce(
                ORDER_FAILED,
                &OrderFailed {
                    error: err.to_string(),
                },
            );
        }
    }
}

/// Marks a submission as pending for as long as it lives.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(StorefrontError::SubmissionInFlight);
        }
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
