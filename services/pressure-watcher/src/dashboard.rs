//! Web dashboard showing the current reading and the reading history

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tokio::sync::RwLock;

use crate::feed::{snapshot_handler, ReadingFeed, Subscription};
use crate::render::{render_page, DashboardView};

/// Thread-safe shared view handle
pub type ViewHandle = Arc<RwLock<DashboardView>>;

pub fn new_view_handle() -> ViewHandle {
    Arc::new(RwLock::new(DashboardView::new()))
}

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub view: ViewHandle,
    pub refresh_interval_seconds: u64,
}

/// Build the dashboard axum router
pub fn build_router(view: ViewHandle, refresh_interval_seconds: u64) -> Router {
    let dashboard_state = DashboardState {
        view,
        refresh_interval_seconds,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

/// Keep `view` in sync with the `history_size` newest readings of `feed`
pub fn attach(feed: &dyn ReadingFeed, view: ViewHandle, history_size: usize) -> Subscription {
    let on_change = snapshot_handler(move |snapshot| {
        let view = Arc::clone(&view);
        async move {
            let mut view = view.write().await;
            view.apply_snapshot(&snapshot);
            tracing::debug!(
                "Dashboard updated: {} readings, status {}",
                snapshot.len(),
                view.status
            );
        }
    });
    feed.subscribe(history_size, on_change)
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.view.read().await;
    Html(render_page(&view, dashboard.refresh_interval_seconds))
}

async fn view_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = dashboard.view.read().await.clone();
    axum::Json(view)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
