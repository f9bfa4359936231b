//! Web dashboard with JSON API endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::api_client::FactoryBackend;
use crate::selector::{hour_options, ZoomBound};
use crate::session::{Session, Theme, UserAccount};
use crate::state::{SharedState, StateHandle};
use crate::zone::{self, NewZone};
use crate::{FactoryEyeError, Result};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub backend: Arc<dyn FactoryBackend>,
    pub accounts: Arc<Vec<UserAccount>>,
}

/// Build the dashboard axum router
pub fn build_router(
    state: StateHandle,
    backend: Arc<dyn FactoryBackend>,
    accounts: Vec<UserAccount>,
) -> Router {
    let dashboard_state = DashboardState {
        state,
        backend,
        accounts: Arc::new(accounts),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/session", get(session_handler))
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        .route("/api/session/theme", put(theme_handler))
        .route("/api/hours", get(hours_handler))
        .route("/api/status", get(status_handler))
        .route("/api/zones", get(zones_handler).post(create_zone_handler))
        .route("/api/zones/{zone_id}", delete(delete_zone_handler))
        .route(
            "/api/zones/{zone_id}/equipment/{name}",
            delete(delete_equipment_handler),
        )
        .route("/api/view", get(view_handler).put(update_view_handler))
        .route("/api/view/prev", post(prev_page_handler))
        .route("/api/view/next", post(next_page_handler))
        .route(
            "/api/view/zoom",
            put(zoom_handler).delete(reset_zoom_handler),
        )
        .layer(cors)
        .with_state(dashboard_state)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ThemeRequest {
    theme: Theme,
}

/// Partial update of the viewing intent; absent fields are left alone
#[derive(Debug, Default, Deserialize)]
struct ViewUpdate {
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    day: Option<NaiveDate>,
    #[serde(default)]
    hour: Option<String>,
    #[serde(default)]
    page: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ZoomRequest {
    bound: ZoomBound,
    value: usize,
}

fn session_json(session: &Session) -> serde_json::Value {
    serde_json::json!({
        "session": session,
        "landing_route": session.landing_route(),
    })
}

fn view_json(state: &SharedState) -> serde_json::Value {
    let selector = &state.view.selector;
    serde_json::json!({
        "equipment": state.view.equipment,
        "day": selector.day().to_string(),
        "hour": selector.hour_label(),
        "window": state.display_window(),
    })
}

/// Accepts `HH:MM:SS` or `HH:MM`
fn parse_hour(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| FactoryEyeError::Validation(format!("Invalid hour '{}'", value)))
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn require_authenticated(dashboard: &DashboardState) -> Result<()> {
    dashboard
        .state
        .read()
        .await
        .session
        .session()
        .require_authenticated()
}

async fn require_admin(dashboard: &DashboardState) -> Result<()> {
    dashboard.state.read().await.session.session().require_admin()
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    let session = state.session.session();

    let user_label = match (&session.username, session.is_authenticated) {
        (Some(name), true) => escape_html(name),
        _ => "Not logged in".to_string(),
    };

    let zone_rows: String = state
        .zones
        .iter()
        .map(|z| {
            format!(
                r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{}</td>
                </tr>"#,
                z.id,
                escape_html(&z.name),
                escape_html(&z.equipment.join(", "))
            )
        })
        .collect();

    let window = state.display_window();
    let sample_rows: String = window
        .samples
        .iter()
        .map(|s| {
            format!(
                r#"<tr style="border-bottom: 1px solid #dee2e6;">
                    <td style="padding: 0.5rem;">{}</td>
                    <td style="padding: 0.5rem;">{:.2}</td>
                    <td style="padding: 0.5rem;">{:.2}</td>
                    <td style="padding: 0.5rem;">{:.2}</td>
                </tr>"#,
                s.clock_label, s.pressure, s.current, s.vibration_mean
            )
        })
        .collect();

    let equipment = state
        .view
        .equipment
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "None selected".to_string());
    let (bg, fg) = match session.theme {
        Theme::Light => ("#ffffff", "#212529"),
        Theme::Dark => ("#212529", "#f8f9fa"),
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>FactoryEYE Dashboard</title>
    <script>
        function refreshData() {{
            fetch('/api/view')
                .then(r => r.ok ? r.json() : null)
                .then(data => {{
                    if (!data) {{ return; }}
                    document.getElementById('page-info').textContent =
                        `Page ${{data.window.page + 1}} / ${{data.window.total_pages}}`;
                    const tbody = document.getElementById('sample-body');
                    tbody.innerHTML = data.window.samples.map(s => `<tr style="border-bottom: 1px solid #dee2e6;">
                            <td style="padding: 0.5rem;">${{s.clock_label}}</td>
                            <td style="padding: 0.5rem;">${{s.pressure.toFixed(2)}}</td>
                            <td style="padding: 0.5rem;">${{s.current.toFixed(2)}}</td>
                            <td style="padding: 0.5rem;">${{s.vibration_mean.toFixed(2)}}</td>
                        </tr>`).join('');
                }});
        }}
        setInterval(refreshData, 5000);
    </script>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem; background-color: {bg}; color: {fg};">
    <h1>FactoryEYE Dashboard</h1>
    <p>{user_label}</p>
    <section>
        <h2>Zones</h2>
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Id</th>
                    <th style="padding: 0.5rem; text-align: left;">Zone</th>
                    <th style="padding: 0.5rem; text-align: left;">Equipment</th>
                </tr>
            </thead>
            <tbody id="zone-body">{zone_rows}</tbody>
        </table>
    </section>
    <section>
        <h2>Sensor Data: {equipment}</h2>
        <p id="page-info">Page {page} / {total_pages}</p>
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Time</th>
                    <th style="padding: 0.5rem; text-align: left;">Pressure</th>
                    <th style="padding: 0.5rem; text-align: left;">Current</th>
                    <th style="padding: 0.5rem; text-align: left;">Vibration</th>
                </tr>
            </thead>
            <tbody id="sample-body">{sample_rows}</tbody>
        </table>
    </section>
</body>
</html>"#,
        bg = bg,
        fg = fg,
        user_label = user_label,
        zone_rows = zone_rows,
        equipment = equipment,
        page = window.page + 1,
        total_pages = window.total_pages,
        sample_rows = sample_rows,
    );

    Html(html)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn session_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(session_json(state.session.session()))
}

async fn login_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut state = dashboard.state.write().await;
    let session = state
        .session
        .login(&dashboard.accounts, &request.username, &request.password)?;
    Ok(Json(session_json(session)))
}

async fn logout_handler(State(dashboard): State<DashboardState>) -> Result<Json<serde_json::Value>> {
    let mut state = dashboard.state.write().await;
    state.session.logout()?;
    Ok(Json(session_json(state.session.session())))
}

async fn theme_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut state = dashboard.state.write().await;
    state.session.set_theme(request.theme)?;
    Ok(Json(session_json(state.session.session())))
}

async fn hours_handler() -> impl IntoResponse {
    Json(hour_options())
}

async fn status_handler(State(dashboard): State<DashboardState>) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let state = dashboard.state.read().await;
    Ok(Json(serde_json::json!({
        "zones_origin": state.zones_origin,
        "series_origin": state.series_origin,
        "sample_count": state.series.len(),
        "zone_count": state.zones.len(),
        "last_refresh_epoch_ms": state.last_refresh_epoch_ms,
        "consecutive_failures": state.consecutive_failures,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    })))
}

async fn zones_handler(State(dashboard): State<DashboardState>) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let state = dashboard.state.read().await;
    Ok(Json(serde_json::json!(state.zones)))
}

async fn create_zone_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<NewZone>,
) -> Result<impl IntoResponse> {
    require_admin(&dashboard).await?;
    zone::create_zone(dashboard.backend.as_ref(), &dashboard.state, request).await?;
    let state = dashboard.state.read().await;
    Ok((StatusCode::CREATED, Json(serde_json::json!(state.zones))))
}

async fn delete_zone_handler(
    State(dashboard): State<DashboardState>,
    Path(zone_id): Path<u64>,
) -> Result<Json<serde_json::Value>> {
    require_admin(&dashboard).await?;
    zone::delete_zone(dashboard.backend.as_ref(), &dashboard.state, zone_id).await?;
    let state = dashboard.state.read().await;
    Ok(Json(serde_json::json!(state.zones)))
}

async fn delete_equipment_handler(
    State(dashboard): State<DashboardState>,
    Path((zone_id, name)): Path<(u64, String)>,
) -> Result<Json<serde_json::Value>> {
    require_admin(&dashboard).await?;
    zone::delete_equipment(dashboard.backend.as_ref(), &dashboard.state, zone_id, &name).await?;
    let state = dashboard.state.read().await;
    Ok(Json(serde_json::json!(state.zones)))
}

async fn view_handler(State(dashboard): State<DashboardState>) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let state = dashboard.state.read().await;
    Ok(Json(view_json(&state)))
}

async fn update_view_handler(
    State(dashboard): State<DashboardState>,
    Json(update): Json<ViewUpdate>,
) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let hour = update.hour.as_deref().map(parse_hour).transpose()?;

    let mut state = dashboard.state.write().await;
    if let Some(equipment) = &update.equipment {
        if !state.has_equipment(equipment) {
            return Err(FactoryEyeError::NotFound(format!(
                "Equipment '{}'",
                equipment
            )));
        }
    }

    tracing::debug!("Updating view: {:?}", update);
    if let Some(equipment) = &update.equipment {
        state.view.select_equipment(equipment);
    }
    if let Some(day) = update.day {
        state.view.selector.set_day(day);
    }
    if let Some(hour) = hour {
        state.view.selector.set_hour(hour);
    }
    if let Some(page) = update.page {
        state.view.selector.set_page(page);
    }
    Ok(Json(view_json(&state)))
}

async fn prev_page_handler(
    State(dashboard): State<DashboardState>,
) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let mut state = dashboard.state.write().await;
    let total_pages = state.display_window().total_pages;
    state.view.selector.prev_page(total_pages);
    Ok(Json(view_json(&state)))
}

async fn next_page_handler(
    State(dashboard): State<DashboardState>,
) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let mut state = dashboard.state.write().await;
    let total_pages = state.display_window().total_pages;
    state.view.selector.next_page(total_pages);
    Ok(Json(view_json(&state)))
}

async fn zoom_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<ZoomRequest>,
) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let mut state = dashboard.state.write().await;
    let page_len = state.display_window().page_len;
    state
        .view
        .selector
        .adjust_zoom(request.bound, request.value, page_len);
    Ok(Json(view_json(&state)))
}

async fn reset_zoom_handler(
    State(dashboard): State<DashboardState>,
) -> Result<Json<serde_json::Value>> {
    require_authenticated(&dashboard).await?;
    let mut state = dashboard.state.write().await;
    state.view.selector.reset_zoom();
    Ok(Json(view_json(&state)))
}
