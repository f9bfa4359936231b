//! Poller: periodically replaces the sensor series

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use crate::api_client::FactoryBackend;
use crate::state::{DataOrigin, StateHandle};
use crate::synthetic;

/// Refreshes the series on a fixed interval until cancelled
pub struct Poller {
    backend: Arc<dyn FactoryBackend>,
    state: StateHandle,
    interval: Duration,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(
        backend: Arc<dyn FactoryBackend>,
        state: StateHandle,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            state,
            interval,
            cancel,
        }
    }

    /// Poll until the cancellation token is triggered
    pub async fn run(&self) {
        loop {
            refresh_series(self.backend.as_ref(), &self.state).await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Polling loop cancelled");
                    break;
                }
            }
        }
    }
}

/// Fetch the series once, substituting synthetic data on failure
pub async fn refresh_series(backend: &dyn FactoryBackend, state: &StateHandle) -> DataOrigin {
    let (series, origin) = match backend.compressor_data().await {
        Ok(series) => (series, DataOrigin::Backend),
        Err(e) => {
            if e.is_transient() {
                tracing::warn!("Failed to fetch compressor data, using synthetic data: {}", e);
            } else {
                tracing::error!("Compressor data rejected, using synthetic data: {}", e);
            }
            (synthetic::generate_series_now(), DataOrigin::Synthetic)
        }
    };

    let now_ms = current_epoch_ms();
    let mut state_lock = state.write().await;
    tracing::debug!("Replacing series with {} samples ({:?})", series.len(), origin);
    state_lock.replace_series(series, origin, now_ms);
    if state_lock.consecutive_failures == 5 {
        tracing::warn!(
            "Compressor data unavailable for {} consecutive polls",
            state_lock.consecutive_failures
        );
    }
    origin
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
