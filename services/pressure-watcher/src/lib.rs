//! Pressure Watcher - pressure gauge upload service and live dashboard
//!
//! Receives photos of an analog pressure gauge, records a reading for each one
//! and shows the latest reading plus a short history on a web dashboard.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod gauge;
pub mod io;
pub mod reading;
pub mod render;
pub mod store;

pub use config::{load_config, Config};
pub use error::{Result, WatcherError};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::api::ApiState;
use crate::config::FeedSource;
use crate::feed::{PollingFeed, ReadingFeed};
use crate::gauge::PlaceholderGaugeReader;
use crate::io::ReqwestHttpClient;
use crate::store::{MemoryStore, StoreHandle};

/// Run the pressure-watcher service until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;
    let cancel = CancellationToken::new();

    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    run_until_cancelled(config, cancel).await
}

/// Run the service until `cancel` is triggered
pub async fn run_until_cancelled(config: Config, cancel: CancellationToken) -> Result<()> {
    let memory_store = config
        .store
        .enabled
        .then(|| MemoryStore::new(config.store.capacity));
    if memory_store.is_none() {
        tracing::warn!("Reading store disabled, uploads will not be recorded");
    }

    let feed: Option<Box<dyn ReadingFeed>> = if config.dashboard.enabled {
        Some(match &config.dashboard.source {
            FeedSource::Local => match &memory_store {
                Some(store) => Box::new(store.clone()),
                None => {
                    return Err(WatcherError::Config(
                        "dashboard source 'local' requires store.enabled".to_string(),
                    ))
                }
            },
            FeedSource::Remote {
                base_url,
                polling_interval_seconds,
            } => Box::new(PollingFeed::new(
                base_url.clone(),
                Duration::from_secs(*polling_interval_seconds),
                Arc::new(ReqwestHttpClient::new()),
            )),
        })
    } else {
        None
    };

    let mut tasks = Vec::new();

    if config.server.enabled {
        let state = ApiState {
            store: memory_store
                .clone()
                .map(|store| Arc::new(store) as StoreHandle),
            gauge: Arc::new(PlaceholderGaugeReader),
            persist_images: config.store.persist_images,
            max_readings: config.store.capacity,
        };
        let router = api::build_router(state, &config.server);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Upload API listening on http://{}", listener.local_addr()?);
        tasks.push(tokio::spawn(serve(listener, router, cancel.clone(), "Upload API")));
    }

    // Held until shutdown; dropping it ends the dashboard feed
    let mut subscription = None;

    if let Some(feed) = feed {
        let view = dashboard::new_view_handle();
        subscription = Some(dashboard::attach(
            feed.as_ref(),
            Arc::clone(&view),
            config.dashboard.history_size,
        ));

        let router = dashboard::build_router(view, config.dashboard.refresh_interval_seconds);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.dashboard.port));
        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                tracing::info!("Dashboard listening on http://{}", listener.local_addr()?);
                tasks.push(tokio::spawn(serve(listener, router, cancel.clone(), "Dashboard")));
            }
            Err(e) => {
                tracing::error!(
                    "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                    config.dashboard.port,
                    e
                );
            }
        }
    }

    tracing::info!("Pressure Watcher initialized");

    cancel.cancelled().await;

    if let Some(subscription) = subscription {
        subscription.shutdown().await;
    }
    for task in tasks {
        let _ = task.await;
    }

    tracing::info!("Pressure Watcher stopped");
    Ok(())
}

async fn serve(
    listener: tokio::net::TcpListener,
    router: Router,
    cancel: CancellationToken,
    name: &'static str,
) {
    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await;

    match result {
        Ok(()) => tracing::debug!("{} stopped", name),
        Err(e) => tracing::error!("{} failed: {}", name, e),
    }
}
