use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::core::{MapEngine, RefreshSummary};
use crate::services::store::{OfferStore, StoreError};

/// Fetch the active offers and apply them to the engine
///
/// The engine lock is only taken around the fetch, never across it, so the
/// previous snapshot stays interactive while the request is in flight.
/// Returns `Ok(None)` when a fetch started later was applied first; the
/// older result is dropped. On failure the engine keeps its state and
/// records the error.
pub async fn refresh_once(
    store: &dyn OfferStore,
    engine: &Mutex<MapEngine>,
) -> Result<Option<RefreshSummary>, StoreError> {
    let ticket = engine.lock().await.begin_fetch();

    match store.list_active_offers().await {
        Ok(records) => Ok(engine.lock().await.apply_fetched(ticket, records)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch active offers, keeping previous snapshot");
            engine.lock().await.record_fetch_failure(e.to_string());
            Err(e)
        }
    }
}

/// Spawn the periodic refresh loop
pub fn spawn_refresh_task(
    store: Arc<dyn OfferStore>,
    engine: Arc<Mutex<MapEngine>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; startup already fetched
        timer.tick().await;

        tracing::info!(interval_secs = period.as_secs(), "Offer refresh loop started");

        loop {
            timer.tick().await;
            // Failures are logged and recorded inside refresh_once
            let _ = refresh_once(store.as_ref(), &engine).await;
        }
    })
}
