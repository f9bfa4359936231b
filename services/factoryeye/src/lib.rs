//! FactoryEYE - Industrial equipment monitoring service
//!
//! Polls the FactoryEYE REST API for compressor sensor data and the zone
//! registry, derives the chart window for the selected equipment, and serves
//! it through a small web dashboard.

pub mod api_client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod poller;
pub mod sample;
pub mod selector;
pub mod session;
pub mod state;
pub mod synthetic;
pub mod window;
pub mod zone;


pub use config::{load_config, Config};
pub use error::{FactoryEyeError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api_client::{FactoryApi, FactoryBackend};
use crate::io::ReqwestHttpClient;
use crate::poller::Poller;
use crate::session::SessionStore;

/// Run the FactoryEYE service with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> =
        Arc::new(ReqwestHttpClient::new(config.api.request_timeout)?);
    let backend: Arc<dyn FactoryBackend> =
        Arc::new(FactoryApi::new(&config.api.base_url, Arc::clone(&http)));
    let cancel = CancellationToken::new();

    let session = match &config.session.path {
        Some(path) => SessionStore::load(path)?,
        None => SessionStore::in_memory(),
    };
    let state = state::new_state_handle(session);

    let origin = zone::refresh_zones(backend.as_ref(), &state).await;
    tracing::info!("Loaded zones ({:?})", origin);

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    if config.dashboard.enabled {
        let dashboard_port = config.dashboard.port;
        let router = dashboard::build_router(
            Arc::clone(&state),
            Arc::clone(&backend),
            config.users.clone(),
        );
        let cancel_for_dashboard = cancel.clone();

        tokio::spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
            tracing::info!("Dashboard listening on http://{}", addr);

            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!(
                        "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                        dashboard_port,
                        e
                    );
                    return;
                }
            };

            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    cancel_for_dashboard.cancelled().await;
                })
                .await
                .ok();

            tracing::debug!("Dashboard stopped");
        });
    }

    let poller = Poller::new(
        Arc::clone(&backend),
        Arc::clone(&state),
        config.polling.interval,
        cancel.clone(),
    );

    tracing::info!(
        "FactoryEYE poller started against {} every {:?}",
        config.api.base_url,
        config.polling.interval
    );

    // Blocks until cancelled
    poller.run().await;
    tracing::info!("FactoryEYE poller stopped");

    Ok(())
}
