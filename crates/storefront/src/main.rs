//! Storefront entry point: loads the catalog and prints it.

use std::sync::Arc;

use domain::events::{self, CatalogChanged};
use event_bus::{Event, EventBus};
use storefront::{Config, HttpStoreApi, Storefront};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn print_catalog(event: &Event) {
    match event.decode::<CatalogChanged>() {
        Ok(payload) => {
            for (index, product) in payload.catalog.iter().enumerate() {
                println!(
                    "{:>3}. {:<40} {:<14} {}",
                    index + 1,
                    product.title,
                    product.category,
                    product.price_label()
                );
            }
        }
        Err(err) => tracing::warn!(error = %err, "unreadable catalog payload"),
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Build the session
    let api = HttpStoreApi::new(&config);
    let session = Arc::new(Storefront::new(EventBus::new(), api.clone(), api));
    if config.trace_events {
        session.trace_events();
    }
    if let Err(err) = session.wire() {
        tracing::error!(error = %err, "failed to wire UI intents");
        std::process::exit(1);
    }
    session.wire_submission();
    session.events().subscribe(events::CATALOG_CHANGED, print_catalog);

    // 3. Load the catalog
    tracing::info!(api = %config.api_url(), "loading catalog");
    if session.load_catalog().await.is_err() {
        std::process::exit(1);
    }
}
