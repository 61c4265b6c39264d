//! BDD step definitions for live subscriptions

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio::sync::mpsc;

use pressure_watcher::dashboard::{attach, new_view_handle};
use pressure_watcher::feed::{snapshot_handler, ReadingFeed};
use pressure_watcher::reading::{Reading, Timestamp};
use pressure_watcher::store::{MemoryStore, ReadingStore};

use crate::world::WatcherWorld;

#[given("an empty reading store")]
fn empty_store(world: &mut WatcherWorld) {
    world.store = Some(MemoryStore::new(100));
}

#[given(expr = "a reading store with {int} readings")]
async fn store_with_readings(world: &mut WatcherWorld, count: i64) {
    let store = MemoryStore::new(100);
    for n in 1..=count {
        store
            .add(Reading::new(n as f64, Timestamp::EpochMillis(n * 1000)))
            .await
            .unwrap();
    }
    world.store = Some(store);
}

#[given("a dashboard attached to the store")]
fn dashboard_attached(world: &mut WatcherWorld) {
    let view = new_view_handle();
    world.subscription = Some(attach(world.store(), Arc::clone(&view), 20));
    world.attached_view = Some(view);
}

#[when(expr = "a subscription to the latest {int} readings is opened")]
fn open_subscription(world: &mut WatcherWorld, latest_n: usize) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = snapshot_handler(move |snapshot| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(snapshot);
        }
    });
    world.subscription = Some(world.store().subscribe(latest_n, handler));
    world.snapshots = Some(rx);
}

#[when(expr = "a reading with pressure {float} is stored")]
async fn store_reading(world: &mut WatcherWorld, pressure: f64) {
    world
        .store()
        .add(Reading::new(pressure, Timestamp::now()))
        .await
        .unwrap();
}

#[when("the subscription is cancelled")]
async fn cancel_subscription(world: &mut WatcherWorld) {
    let subscription = world.subscription.take().expect("no subscription");
    subscription.shutdown().await;
}

#[then(expr = "a snapshot of {int} readings should arrive")]
async fn snapshot_should_arrive(world: &mut WatcherWorld, count: usize) {
    let rx = world.snapshots.as_mut().expect("no subscription");
    let snapshot = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("subscription closed");
    assert_eq!(snapshot.len(), count);

    let pressures: Vec<f64> = snapshot.iter().filter_map(|r| r.pressure).collect();
    let mut sorted = pressures.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(pressures, sorted, "snapshot is not newest first");
    world.last_snapshot = Some(snapshot);
}

#[then(expr = "the newest snapshot reading should have pressure {float}")]
fn newest_has_pressure(world: &mut WatcherWorld, pressure: f64) {
    let snapshot = world.last_snapshot.as_ref().expect("no snapshot received");
    let newest = snapshot.first().expect("snapshot is empty");
    assert_eq!(newest.pressure, Some(pressure));
}

#[then("no further snapshot should arrive")]
async fn no_further_snapshot(world: &mut WatcherWorld) {
    let rx = world.snapshots.as_mut().expect("no subscription");
    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("channel was not closed");
    assert!(next.is_none());
}

#[then(expr = "the dashboard status should become {string}")]
async fn dashboard_status_becomes(world: &mut WatcherWorld, expected: String) {
    let view = world.attached_view.as_ref().expect("no dashboard attached");
    for _ in 0..200 {
        if view.read().await.status.to_string() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("dashboard status never became {}", expected);
}

#[then(expr = "the dashboard pressure should be {string}")]
async fn dashboard_pressure(world: &mut WatcherWorld, expected: String) {
    let view = world.attached_view.as_ref().expect("no dashboard attached");
    assert_eq!(view.read().await.pressure_value, expected);
}
