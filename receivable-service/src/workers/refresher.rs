//! Aggregate cache refresher.
//!
//! Recomputes the four dashboard sums on a fixed interval and publishes them
//! to the cache. Runs independently of request handling: it only reads the
//! store and writes the cache, and a failed tick is healed by the next one.

use crate::services::cache::AggregateCache;
use crate::services::metrics::CACHE_REFRESH_TICKS;
use crate::services::InvoiceStore;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub const OPEN_TOTAL_KEY: &str = "open_total";
pub const OPEN_MONTH_KEY: &str = "open_month";
pub const SETTLED_TOTAL_KEY: &str = "settled_total";
pub const SETTLED_MONTH_KEY: &str = "settled_month";

pub struct AggregateRefresher {
    store: Arc<dyn InvoiceStore>,
    cache: Arc<dyn AggregateCache>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl AggregateRefresher {
    pub fn new(
        store: Arc<dyn InvoiceStore>,
        cache: Arc<dyn AggregateCache>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            cache,
            interval,
            shutdown,
        }
    }

    /// Spawn the tick loop. Tick failures are logged and swallowed; there is
    /// no caller to surface them to.
    pub fn start(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Starting aggregate refresher");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        tracing::info!("Aggregate refresher shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        match self.refresh_once().await {
                            Ok(()) => {
                                CACHE_REFRESH_TICKS.with_label_values(&["ok"]).inc();
                            }
                            Err(e) => {
                                CACHE_REFRESH_TICKS.with_label_values(&["failed"]).inc();
                                tracing::warn!(error = %e, "Aggregate refresh tick failed");
                            }
                        }
                    }
                }
            }
        });
    }

    /// One refresh pass: compute the four sums, then write each key. Key
    /// writes are independent; a failed write leaves that key stale until
    /// the next tick.
    #[instrument(skip(self))]
    pub async fn refresh_once(&self) -> Result<(), AppError> {
        let open_total = self.store.sum_amount(false, false).await?;
        let open_month = self.store.sum_amount(false, true).await?;
        let settled_total = self.store.sum_amount(true, false).await?;
        let settled_month = self.store.sum_amount(true, true).await?;

        let entries = [
            (OPEN_TOTAL_KEY, open_total),
            (OPEN_MONTH_KEY, open_month),
            (SETTLED_TOTAL_KEY, settled_total),
            (SETTLED_MONTH_KEY, settled_month),
        ];

        for (key, value) in entries {
            if let Err(e) = self.cache.set(key, &value.to_string()).await {
                tracing::warn!(key = %key, error = %e, "Aggregate cache write failed");
            }
        }

        Ok(())
    }
}
