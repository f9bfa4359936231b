//! Shared state for the sensor series, zone registry, view and session

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::sample::Sample;
use crate::selector::EquipmentView;
use crate::session::SessionStore;
use crate::window::DisplayWindow;
use crate::zone::{NewZone, Zone};

/// Where the data currently held came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Backend,
    Synthetic,
}

/// Shared state accessible by the poller and the dashboard
#[derive(Debug)]
pub struct SharedState {
    pub zones: Vec<Zone>,
    pub zones_origin: DataOrigin,
    pub series: Vec<Sample>,
    pub series_origin: DataOrigin,
    pub last_refresh_epoch_ms: u64,
    pub consecutive_failures: u32,
    pub view: EquipmentView,
    pub session: SessionStore,
    pub started_at: Instant,
}

impl SharedState {
    pub fn new(session: SessionStore) -> Self {
        Self {
            zones: Vec::new(),
            zones_origin: DataOrigin::Backend,
            series: Vec::new(),
            series_origin: DataOrigin::Backend,
            last_refresh_epoch_ms: 0,
            consecutive_failures: 0,
            view: EquipmentView::default(),
            session,
            started_at: Instant::now(),
        }
    }

    /// Replace the whole series with a freshly fetched or generated one
    pub fn replace_series(&mut self, series: Vec<Sample>, origin: DataOrigin, now_ms: u64) {
        self.series = series;
        self.series_origin = origin;
        self.last_refresh_epoch_ms = now_ms;
        match origin {
            DataOrigin::Backend => self.consecutive_failures = 0,
            DataOrigin::Synthetic => self.consecutive_failures += 1,
        }
    }

    pub fn replace_zones(&mut self, zones: Vec<Zone>, origin: DataOrigin) {
        self.zones = zones;
        self.zones_origin = origin;
    }

    /// Insert a zone at the front with the next free id
    pub fn add_local_zone(&mut self, zone: &NewZone) -> Zone {
        let id = self.zones.iter().map(|z| z.id).max().unwrap_or(0) + 1;
        let created = Zone {
            id,
            name: zone.name.clone(),
            equipment: zone
                .equipment
                .iter()
                .filter(|e| !e.trim().is_empty())
                .cloned()
                .collect(),
        };
        self.zones.insert(0, created.clone());
        created
    }

    /// Remove a zone, returning false if there was none with that id
    pub fn remove_local_zone(&mut self, zone_id: u64) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != zone_id);
        self.zones.len() != before
    }

    /// Remove equipment from a zone, returning false if it was not there
    pub fn remove_local_equipment(&mut self, zone_id: u64, equipment: &str) -> bool {
        let Some(zone) = self.zones.iter_mut().find(|z| z.id == zone_id) else {
            return false;
        };
        let before = zone.equipment.len();
        zone.equipment.retain(|e| e != equipment);
        zone.equipment.len() != before
    }

    /// Whether `name` is installed in any known zone
    pub fn has_equipment(&self, name: &str) -> bool {
        self.zones
            .iter()
            .any(|z| z.equipment.iter().any(|e| e == name))
    }

    pub fn display_window(&self) -> DisplayWindow {
        self.view.window(&self.series)
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(session: SessionStore) -> StateHandle {
    Arc::new(RwLock::new(SharedState::new(session)))
}
