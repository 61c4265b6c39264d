//! BDD test world for the pressure-watcher service

use cucumber::World;
use pressure_watcher::dashboard::ViewHandle;
use pressure_watcher::feed::{Snapshot, Subscription};
use pressure_watcher::render::DashboardView;
use pressure_watcher::store::MemoryStore;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Default, World)]
pub struct WatcherWorld {
    // Rendering
    pub view: Option<DashboardView>,
    pub page: Option<String>,

    // Upload API
    pub store: Option<MemoryStore>,
    pub api_has_store: bool,
    pub response_status: Option<u16>,
    pub response_json: Option<serde_json::Value>,

    // Subscriptions
    pub subscription: Option<Subscription>,
    pub snapshots: Option<UnboundedReceiver<Snapshot>>,
    pub last_snapshot: Option<Snapshot>,
    pub attached_view: Option<ViewHandle>,
}

impl WatcherWorld {
    pub fn view_mut(&mut self) -> &mut DashboardView {
        self.view.get_or_insert_with(DashboardView::new)
    }

    pub fn store(&self) -> &MemoryStore {
        self.store.as_ref().expect("reading store not set")
    }
}
