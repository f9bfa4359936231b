//! Zone and equipment registry

use serde::{Deserialize, Serialize};

use crate::api_client::FactoryBackend;
use crate::state::{DataOrigin, StateHandle};
use crate::synthetic;
use crate::FactoryEyeError;

const DEFAULT_DESCRIPTION: &str = "Description par défaut";
const DEFAULT_LOCATION: &str = "Localisation par défaut";

/// A production zone and the equipment installed in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u64,
    pub name: String,
    pub equipment: Vec<String>,
}

/// Request to create a zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewZone {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub equipment: Option<String>,
}

impl NewZone {
    pub fn new(name: &str, equipment: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            location: String::new(),
            equipment: equipment.map(str::to_string),
        }
    }

    /// Reject zones without a usable name
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(FactoryEyeError::Validation(
                "Zone name is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Body for `POST /api/zones`
    pub fn to_request_body(&self) -> serde_json::Value {
        let or_default = |value: &str, default: &str| {
            if value.trim().is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        serde_json::json!({
            "zoneName": self.name,
            "description": or_default(&self.description, DEFAULT_DESCRIPTION),
            "location": or_default(&self.location, DEFAULT_LOCATION),
            "equipment": [self.equipment.clone().unwrap_or_default()],
        })
    }
}

/// Reload zones from the backend, falling back to the mock registry.
///
/// Returns the origin of the zones now held in state.
pub async fn refresh_zones(backend: &dyn FactoryBackend, state: &StateHandle) -> DataOrigin {
    match backend.list_zones().await {
        Ok(zones) => {
            state.write().await.replace_zones(zones, DataOrigin::Backend);
            DataOrigin::Backend
        }
        Err(e) => {
            tracing::warn!("Failed to load zones, using mock zones: {}", e);
            state
                .write()
                .await
                .replace_zones(synthetic::mock_zones(), DataOrigin::Synthetic);
            DataOrigin::Synthetic
        }
    }
}

async fn zones_origin(state: &StateHandle) -> DataOrigin {
    state.read().await.zones_origin
}

/// Create a zone, locally when the registry is synthetic
pub async fn create_zone(
    backend: &dyn FactoryBackend,
    state: &StateHandle,
    zone: NewZone,
) -> crate::Result<()> {
    zone.validate()?;

    if zones_origin(state).await == DataOrigin::Synthetic {
        let created = state.write().await.add_local_zone(&zone);
        tracing::info!("Created local zone '{}' with id {}", created.name, created.id);
        return Ok(());
    }

    backend.create_zone(&zone).await?;
    tracing::info!("Created zone '{}'", zone.name);
    refresh_zones(backend, state).await;
    Ok(())
}

/// Delete a zone, locally when the registry is synthetic
pub async fn delete_zone(
    backend: &dyn FactoryBackend,
    state: &StateHandle,
    zone_id: u64,
) -> crate::Result<()> {
    if zones_origin(state).await == DataOrigin::Synthetic {
        if !state.write().await.remove_local_zone(zone_id) {
            return Err(FactoryEyeError::NotFound(format!("Zone {}", zone_id)));
        }
        tracing::info!("Deleted local zone {}", zone_id);
        return Ok(());
    }

    backend.delete_zone(zone_id).await?;
    tracing::info!("Deleted zone {}", zone_id);
    refresh_zones(backend, state).await;
    Ok(())
}

/// Remove one piece of equipment from a zone.
///
/// If it was the charted equipment the selection is cleared.
pub async fn delete_equipment(
    backend: &dyn FactoryBackend,
    state: &StateHandle,
    zone_id: u64,
    equipment: &str,
) -> crate::Result<()> {
    if zones_origin(state).await == DataOrigin::Synthetic {
        let mut state_lock = state.write().await;
        if !state_lock.remove_local_equipment(zone_id, equipment) {
            return Err(FactoryEyeError::NotFound(format!(
                "Equipment '{}' in zone {}",
                equipment, zone_id
            )));
        }
        state_lock.view.clear_equipment_if(equipment);
        tracing::info!("Deleted local equipment '{}' from zone {}", equipment, zone_id);
        return Ok(());
    }

    backend.delete_equipment(zone_id, equipment).await?;
    tracing::info!("Deleted equipment '{}' from zone {}", equipment, zone_id);
    refresh_zones(backend, state).await;
    state.write().await.view.clear_equipment_if(equipment);
    Ok(())
}
