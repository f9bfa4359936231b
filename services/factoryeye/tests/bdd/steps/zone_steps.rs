//! BDD step definitions for the zone registry feature

use std::sync::Arc;

use cucumber::{given, then, when};

use factoryeye::session::SessionStore;
use factoryeye::state::{new_state_handle, DataOrigin};
use factoryeye::zone::{self, NewZone};
use factoryeye::FactoryEyeError;

use crate::world::{FactoryEyeWorld, StubHttpClient};

fn zones_body(first: &str, second: &str) -> String {
    serde_json::json!([
        {"id_zone": 1, "zoneName": first, "equipment": [{"name": "Pompe A"}]},
        {"id_zone": 2, "zoneName": second, "equipment": []},
    ])
    .to_string()
}

fn install(world: &mut FactoryEyeWorld, http: StubHttpClient) {
    world.http = Some(Arc::new(http));
    world.state = Some(new_state_handle(SessionStore::in_memory()));
}

#[given(expr = "a FactoryEYE API with zones {string} and {string}")]
fn api_with_zones(world: &mut FactoryEyeWorld, first: String, second: String) {
    install(world, StubHttpClient::reachable(&zones_body(&first, &second)));
}

#[given(expr = "a FactoryEYE API with zones {string} and {string} that rejects changes")]
fn api_rejecting_changes(world: &mut FactoryEyeWorld, first: String, second: String) {
    let mut http = StubHttpClient::reachable(&zones_body(&first, &second));
    http.mutation_status = 500;
    install(world, http);
}

#[given("an unreachable FactoryEYE API")]
fn unreachable_api(world: &mut FactoryEyeWorld) {
    install(world, StubHttpClient::unreachable());
}

#[given("the zones are refreshed")]
async fn zones_loaded(world: &mut FactoryEyeWorld) {
    zone::refresh_zones(&world.backend(), &world.state()).await;
}

#[when("the zones are refreshed")]
async fn refresh_zones(world: &mut FactoryEyeWorld) {
    zone::refresh_zones(&world.backend(), &world.state()).await;
}

#[given(expr = "the equipment {string} is selected")]
async fn equipment_selected(world: &mut FactoryEyeWorld, name: String) {
    world.state().write().await.view.select_equipment(&name);
}

#[when(expr = "the zone {string} is created with equipment {string}")]
async fn create_zone(world: &mut FactoryEyeWorld, name: String, equipment: String) {
    let request = NewZone::new(&name, Some(&equipment));
    world.last_error = zone::create_zone(&world.backend(), &world.state(), request)
        .await
        .err();
}

#[when(expr = "the equipment {string} is removed from zone {int}")]
async fn remove_equipment(world: &mut FactoryEyeWorld, name: String, zone_id: u64) {
    world.last_error = zone::delete_equipment(&world.backend(), &world.state(), zone_id, &name)
        .await
        .err();
}

#[when(expr = "zone {int} is deleted")]
async fn delete_zone(world: &mut FactoryEyeWorld, zone_id: u64) {
    world.last_error = zone::delete_zone(&world.backend(), &world.state(), zone_id)
        .await
        .err();
}

#[then("the zones come from the backend")]
async fn zones_from_backend(world: &mut FactoryEyeWorld) {
    assert_eq!(world.state().read().await.zones_origin, DataOrigin::Backend);
}

#[then("the zones are synthetic")]
async fn zones_synthetic(world: &mut FactoryEyeWorld) {
    assert_eq!(world.state().read().await.zones_origin, DataOrigin::Synthetic);
}

#[then(expr = "the zone names are {string}")]
async fn zone_names(world: &mut FactoryEyeWorld, expected: String) {
    let names: Vec<String> = world
        .state()
        .read()
        .await
        .zones
        .iter()
        .map(|z| z.name.clone())
        .collect();
    assert_eq!(names.join(", "), expected);
}

#[then(expr = "the first zone is {string} with id {int}")]
async fn first_zone(world: &mut FactoryEyeWorld, name: String, id: u64) {
    let state = world.state();
    let state_lock = state.read().await;
    let first = state_lock.zones.first().expect("no zones");
    assert_eq!(first.name, name);
    assert_eq!(first.id, id);
}

#[then(expr = "zone {int} has equipment {string}")]
async fn zone_has_equipment(world: &mut FactoryEyeWorld, zone_id: u64, expected: String) {
    let state = world.state();
    let state_lock = state.read().await;
    let zone = state_lock
        .zones
        .iter()
        .find(|z| z.id == zone_id)
        .expect("zone not found");
    assert_eq!(zone.equipment.join(", "), expected);
}

#[then("no equipment is selected")]
async fn no_equipment_selected(world: &mut FactoryEyeWorld) {
    assert_eq!(world.state().read().await.view.equipment, None);
}

#[then("no change was sent to the API")]
fn no_change_sent(world: &mut FactoryEyeWorld) {
    let http = world.http.as_ref().expect("backend not set");
    assert!(http
        .requests()
        .iter()
        .all(|r| r.starts_with("GET ")));
}

#[then(expr = "the API received {string}")]
fn api_received(world: &mut FactoryEyeWorld, expected: String) {
    let http = world.http.as_ref().expect("backend not set");
    let requests = http.requests();
    assert!(
        requests.contains(&expected),
        "Expected request '{}', got {:?}",
        expected,
        requests
    );
}

#[then("the operation fails with a server error")]
fn fails_with_server_error(world: &mut FactoryEyeWorld) {
    assert!(matches!(
        world.last_error,
        Some(FactoryEyeError::Server { status: 500, .. })
    ));
}

#[then("the operation fails with a validation error")]
fn fails_with_validation_error(world: &mut FactoryEyeWorld) {
    assert!(matches!(world.last_error, Some(FactoryEyeError::Validation(_))));
}

#[then("the operation fails with a not found error")]
fn fails_with_not_found(world: &mut FactoryEyeWorld) {
    assert!(matches!(world.last_error, Some(FactoryEyeError::NotFound(_))));
}
