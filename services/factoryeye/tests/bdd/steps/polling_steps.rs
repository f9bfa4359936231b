//! BDD step definitions for the polling feature

use std::sync::Arc;

use cucumber::{given, then, when};

use factoryeye::poller::refresh_series;
use factoryeye::session::SessionStore;
use factoryeye::state::{new_state_handle, DataOrigin};

use crate::world::{FactoryEyeWorld, StubHttpClient};

fn readings_body(count: usize) -> String {
    let readings: Vec<serde_json::Value> = (0..count)
        .rev()
        .map(|i| {
            serde_json::json!({
                "timestamp": format!("2023-01-01T09:00:{:02}", i * 20),
                "pressure": 6.1,
                "currentValue": 12.4,
                "vibrationX": 1.0,
                "vibrationY": 1.2,
                "vibrationZ": 1.4,
            })
        })
        .collect();
    serde_json::Value::Array(readings).to_string()
}

fn serving(count: usize) -> StubHttpClient {
    let mut http = StubHttpClient::reachable("[]");
    http.data_body = readings_body(count);
    http
}

#[given(expr = "a FactoryEYE API serving {int} compressor readings")]
fn api_serving(world: &mut FactoryEyeWorld, count: usize) {
    world.http = Some(Arc::new(serving(count)));
    world.state = Some(new_state_handle(SessionStore::in_memory()));
}

#[given("the series is refreshed twice")]
async fn refreshed_twice(world: &mut FactoryEyeWorld) {
    for _ in 0..2 {
        refresh_series(&world.backend(), &world.state()).await;
    }
}

#[when(expr = "the API comes back serving {int} compressor readings")]
fn api_back(world: &mut FactoryEyeWorld, count: usize) {
    world.http = Some(Arc::new(serving(count)));
}

#[when("the series is refreshed")]
async fn refreshed(world: &mut FactoryEyeWorld) {
    refresh_series(&world.backend(), &world.state()).await;
}

#[then("the series comes from the backend")]
async fn series_from_backend(world: &mut FactoryEyeWorld) {
    assert_eq!(world.state().read().await.series_origin, DataOrigin::Backend);
}

#[then("the series is synthetic")]
async fn series_synthetic(world: &mut FactoryEyeWorld) {
    assert_eq!(world.state().read().await.series_origin, DataOrigin::Synthetic);
}

#[then(expr = "the series holds {int} samples")]
async fn series_len(world: &mut FactoryEyeWorld, expected: usize) {
    assert_eq!(world.state().read().await.series.len(), expected);
}

#[then(expr = "the first sample of the series is at {string}")]
async fn first_series_sample(world: &mut FactoryEyeWorld, expected: String) {
    let state = world.state();
    let state_lock = state.read().await;
    assert_eq!(state_lock.series[0].clock_label, expected);
}

#[then(expr = "{int} consecutive failure(s) is/are recorded")]
async fn failures_recorded(world: &mut FactoryEyeWorld, expected: u32) {
    assert_eq!(world.state().read().await.consecutive_failures, expected);
}
