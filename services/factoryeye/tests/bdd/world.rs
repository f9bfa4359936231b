//! BDD test world for the FactoryEYE service

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use cucumber::World;
use factoryeye::api_client::FactoryApi;
use factoryeye::io::{HttpClient, HttpResponse};
use factoryeye::sample::Sample;
use factoryeye::selector::WindowSelector;
use factoryeye::session::{Role, SessionStore, UserAccount};
use factoryeye::state::StateHandle;
use factoryeye::window::DisplayWindow;
use factoryeye::FactoryEyeError;

pub const BASE_URL: &str = "http://factory.test";

/// Serves canned FactoryEYE API responses and records every request
#[derive(Debug)]
pub struct StubHttpClient {
    pub reachable: bool,
    pub zones_body: String,
    pub data_body: String,
    pub mutation_status: u16,
    pub requests: Mutex<Vec<String>>,
}

impl StubHttpClient {
    pub fn reachable(zones_body: &str) -> Self {
        Self {
            reachable: true,
            zones_body: zones_body.to_string(),
            data_body: "[]".to_string(),
            mutation_status: 200,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::reachable("[]")
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str, url: &str) -> factoryeye::Result<()> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", method, url));
        if self.reachable {
            Ok(())
        } else {
            Err(FactoryEyeError::Network(format!(
                "{} {} failed: connection refused",
                method, url
            )))
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for StubHttpClient {
    async fn get(&self, url: &str) -> factoryeye::Result<HttpResponse> {
        self.record("GET", url)?;
        let body = if url.ends_with("/api/zones") {
            self.zones_body.clone()
        } else {
            self.data_body.clone()
        };
        Ok(HttpResponse { status: 200, body })
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
    ) -> factoryeye::Result<HttpResponse> {
        self.record("POST", url)?;
        Ok(HttpResponse {
            status: self.mutation_status,
            body: "{}".to_string(),
        })
    }

    async fn delete(&self, url: &str) -> factoryeye::Result<HttpResponse> {
        self.record("DELETE", url)?;
        Ok(HttpResponse {
            status: self.mutation_status,
            body: String::new(),
        })
    }
}

#[derive(Debug, Default, World)]
pub struct FactoryEyeWorld {
    // Windowing
    pub series: Vec<Sample>,
    pub selector: Option<WindowSelector>,
    pub window: Option<DisplayWindow>,

    // Registry, polling and dashboard
    pub http: Option<Arc<StubHttpClient>>,
    pub state: Option<StateHandle>,
    pub last_error: Option<FactoryEyeError>,
    pub response_status: Option<u16>,
    pub response_body: Option<String>,

    // Session
    pub session_dir: Option<tempfile::TempDir>,
    pub store: Option<SessionStore>,
}

impl FactoryEyeWorld {
    pub fn selector_mut(&mut self) -> &mut WindowSelector {
        self.selector
            .get_or_insert_with(|| WindowSelector::new(parse_day("2023-01-01")))
    }

    pub fn state(&self) -> StateHandle {
        Arc::clone(self.state.as_ref().expect("state not set"))
    }

    pub fn backend(&self) -> FactoryApi {
        let http: Arc<dyn HttpClient> = self.http.clone().expect("backend not set");
        FactoryApi::new(BASE_URL, http)
    }
}

pub fn parse_day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("invalid day")
}

pub fn parse_time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M:%S").expect("invalid time")
}

/// `count` samples `step` seconds apart starting at `start` on `day`
pub fn regular_series(count: i64, step: i64, start: &str, day: &str) -> Vec<Sample> {
    let first = NaiveDateTime::new(parse_day(day), parse_time(start)).and_utc();
    (0..count)
        .map(|i| {
            let ts = first + Duration::seconds(i * step);
            Sample::new(Some(ts), 6.0, 12.0, 1.0, 1.5, 2.0)
        })
        .collect()
}

pub fn accounts() -> Vec<UserAccount> {
    vec![
        UserAccount {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            display_name: "Admin".to_string(),
            role: Role::Admin,
            user_id: None,
        },
        UserAccount {
            username: "operator".to_string(),
            password: "user123".to_string(),
            display_name: "Line Operator".to_string(),
            role: Role::User,
            user_id: Some(2),
        },
    ]
}
