//! BDD step definitions for dashboard rendering

use cucumber::{given, then, when};

use pressure_watcher::reading::{Reading, Timestamp};
use pressure_watcher::render::{render_page, DashboardView, HISTORY_PLACEHOLDER};

use crate::world::WatcherWorld;

fn reading(pressure: f64, epoch_ms: i64) -> Reading {
    Reading::new(pressure, Timestamp::EpochMillis(epoch_ms))
}

#[given("a fresh dashboard")]
fn fresh_dashboard(world: &mut WatcherWorld) {
    world.view = Some(DashboardView::new());
}

#[when(expr = "a reading with pressure {float} is shown as current")]
fn show_reading(world: &mut WatcherWorld, pressure: f64) {
    world
        .view_mut()
        .update_current_reading(&reading(pressure, 1_700_000_000_000));
}

#[when(expr = "a reading with pressure {float} and image {string} is shown as current")]
fn show_reading_with_image(world: &mut WatcherWorld, pressure: f64, image: String) {
    world
        .view_mut()
        .update_current_reading(&reading(pressure, 1_700_000_000_000).with_image(image));
}

#[when(expr = "a snapshot of {int} readings arrives")]
fn snapshot_arrives(world: &mut WatcherWorld, count: usize) {
    // Newest first: pressure N at the latest timestamp down to 1
    let snapshot: Vec<Reading> = (1..=count)
        .rev()
        .map(|n| reading(n as f64, n as i64 * 1000))
        .collect();
    world.view_mut().apply_snapshot(&snapshot);
}

#[when("an empty snapshot arrives")]
fn empty_snapshot_arrives(world: &mut WatcherWorld) {
    world.view_mut().apply_snapshot(&[]);
}

#[when("the dashboard page is rendered")]
fn page_rendered(world: &mut WatcherWorld) {
    let page = render_page(world.view_mut(), 5);
    world.page = Some(page);
}

#[then(expr = "the pressure value should be {string}")]
fn pressure_value_is(world: &mut WatcherWorld, expected: String) {
    assert_eq!(world.view_mut().pressure_value, expected);
}

#[then(expr = "the status indicator should be {string}")]
fn status_is(world: &mut WatcherWorld, expected: String) {
    assert_eq!(world.view_mut().status.to_string(), expected);
}

#[then(expr = "the gauge image source should be {string}")]
fn image_source_is(world: &mut WatcherWorld, expected: String) {
    assert_eq!(
        world.view_mut().gauge_image_src.as_deref(),
        Some(expected.as_str())
    );
}

#[then("the image placeholder should be visible")]
fn placeholder_visible(world: &mut WatcherWorld) {
    assert!(world.view_mut().placeholder_visible);
    assert!(world.view_mut().gauge_image_src.is_none());
}

#[then("the image placeholder should be hidden")]
fn placeholder_hidden(world: &mut WatcherWorld) {
    assert!(!world.view_mut().placeholder_visible);
}

#[then("the history should show the empty placeholder")]
fn history_is_placeholder(world: &mut WatcherWorld) {
    assert_eq!(world.view_mut().history_html, HISTORY_PLACEHOLDER);
}

#[then(expr = "the history should show {int} rows")]
fn history_rows(world: &mut WatcherWorld, count: usize) {
    let html = &world.view_mut().history_html;
    assert_eq!(html.matches(r#"class="history-item""#).count(), count);
}

#[then(expr = "the history should list pressures {string}")]
fn history_lists(world: &mut WatcherWorld, expected: String) {
    let html = world.view_mut().history_html.clone();
    let mut last = 0;
    for pressure in expected.split(',').map(str::trim) {
        let needle = format!("{} PSI", pressure);
        let pos = html[last..]
            .find(&needle)
            .unwrap_or_else(|| panic!("'{}' missing or out of order in:\n{}", needle, html));
        last += pos + needle.len();
    }
}

#[then(expr = "the page should contain element {string}")]
fn page_contains_element(world: &mut WatcherWorld, id: String) {
    let page = world.page.as_ref().expect("page not rendered");
    assert!(
        page.contains(&format!(r#"id="{}""#, id)),
        "Expected page to contain element '{}'",
        id
    );
}
