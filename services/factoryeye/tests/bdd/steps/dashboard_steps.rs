//! BDD step definitions for the dashboard feature

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use cucumber::{given, then, when};
use tower::ServiceExt;

use factoryeye::api_client::FactoryBackend;
use factoryeye::dashboard::build_router;
use factoryeye::session::SessionStore;
use factoryeye::state::{new_state_handle, DataOrigin};
use factoryeye::zone;

use crate::world::{accounts, parse_day, regular_series, FactoryEyeWorld, StubHttpClient};

async fn send(world: &mut FactoryEyeWorld, request: String, body: Option<String>) {
    let (method, uri) = request.split_once(' ').expect("expected 'METHOD /path'");
    let backend: Arc<dyn FactoryBackend> = Arc::new(world.backend());
    let app = build_router(world.state(), backend, accounts());

    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[given("a dashboard backed by an unreachable FactoryEYE API")]
async fn dashboard_offline(world: &mut FactoryEyeWorld) {
    world.http = Some(Arc::new(StubHttpClient::unreachable()));
    world.state = Some(new_state_handle(SessionStore::in_memory()));
    zone::refresh_zones(&world.backend(), &world.state()).await;
}

#[given(expr = "the dashboard holds {int} samples every {int} seconds from {string} on {string}")]
async fn dashboard_samples(
    world: &mut FactoryEyeWorld,
    count: i64,
    step_secs: i64,
    start: String,
    day: String,
) {
    let series = regular_series(count, step_secs, &start, &day);
    let state = world.state();
    let mut state_lock = state.write().await;
    state_lock.replace_series(series, DataOrigin::Backend, 1000);
    state_lock.view.selector.set_day(parse_day(&day));
}

#[given(expr = "the dashboard user is {string} with password {string}")]
async fn dashboard_user(world: &mut FactoryEyeWorld, username: String, password: String) {
    let state = world.state();
    let mut state_lock = state.write().await;
    state_lock
        .session
        .login(&accounts(), &username, &password)
        .unwrap();
}

#[given(expr = "{string} was requested with body {string}")]
async fn requested_with_body(world: &mut FactoryEyeWorld, request: String, body: String) {
    send(world, request, Some(body)).await;
}

#[when(expr = "{string} is requested with body {string}")]
async fn request_with_body(world: &mut FactoryEyeWorld, request: String, body: String) {
    send(world, request, Some(body)).await;
}

#[when(expr = "{string} is requested")]
async fn request(world: &mut FactoryEyeWorld, req: String) {
    send(world, req, None).await;
}

#[when(expr = "{string} is requested {int} times")]
async fn request_repeatedly(world: &mut FactoryEyeWorld, request: String, times: usize) {
    for _ in 0..times {
        send(world, request.clone(), None).await;
    }
}

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut FactoryEyeWorld, expected: u16) {
    assert_eq!(world.response_status, Some(expected));
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut FactoryEyeWorld, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}
