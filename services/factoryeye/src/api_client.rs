//! FactoryEYE REST API client

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::io::{HttpClient, HttpResponse};
use crate::sample::{samples_from_readings, RawReading, Sample};
use crate::zone::{NewZone, Zone};
use crate::FactoryEyeError;

/// Zone as returned by `GET /api/zones`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneRecord {
    #[serde(default, rename = "id_zone")]
    id_zone: Option<u64>,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    zone_name: String,
    #[serde(default)]
    equipment: Option<Vec<EquipmentRecord>>,
}

#[derive(Debug, Deserialize)]
struct EquipmentRecord {
    name: String,
}

impl From<ZoneRecord> for Zone {
    fn from(record: ZoneRecord) -> Self {
        Zone {
            id: record.id_zone.or(record.id).unwrap_or_default(),
            name: record.zone_name,
            equipment: record
                .equipment
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.name)
                .collect(),
        }
    }
}

/// Backend operations the service depends on
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait FactoryBackend: Send + Sync {
    /// List zones, most recently created first
    async fn list_zones(&self) -> crate::Result<Vec<Zone>>;

    async fn create_zone(&self, zone: &NewZone) -> crate::Result<()>;

    async fn delete_zone(&self, zone_id: u64) -> crate::Result<()>;

    async fn delete_equipment(&self, zone_id: u64, equipment: &str) -> crate::Result<()>;

    /// Fetch the compressor series, sorted by timestamp
    async fn compressor_data(&self) -> crate::Result<Vec<Sample>>;
}

/// REST implementation of [`FactoryBackend`]
pub struct FactoryApi {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for FactoryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl FactoryApi {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created FactoryApi at {}", base_url);
        Self { base_url, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into a server error
fn ensure_success(url: &str, response: HttpResponse) -> crate::Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(FactoryEyeError::Server {
            status: response.status,
            url: url.to_string(),
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, body: &str) -> crate::Result<T> {
    serde_json::from_str(body).map_err(|e| FactoryEyeError::Decode(format!("{}: {}", url, e)))
}

#[async_trait]
impl FactoryBackend for FactoryApi {
    async fn list_zones(&self) -> crate::Result<Vec<Zone>> {
        let url = self.url("/api/zones");
        let response = ensure_success(&url, self.http.get(&url).await?)?;
        let records: Vec<ZoneRecord> = decode(&url, &response.body)?;
        let mut zones: Vec<Zone> = records.into_iter().map(Zone::from).collect();
        zones.reverse();
        tracing::debug!("Listed {} zones", zones.len());
        Ok(zones)
    }

    async fn create_zone(&self, zone: &NewZone) -> crate::Result<()> {
        let url = self.url("/api/zones");
        let body = zone.to_request_body();
        ensure_success(&url, self.http.post_json(&url, &body).await?)?;
        tracing::debug!("Created zone '{}'", zone.name);
        Ok(())
    }

    async fn delete_zone(&self, zone_id: u64) -> crate::Result<()> {
        let url = self.url(&format!("/api/zones/{}", zone_id));
        ensure_success(&url, self.http.delete(&url).await?)?;
        tracing::debug!("Deleted zone {}", zone_id);
        Ok(())
    }

    async fn delete_equipment(&self, zone_id: u64, equipment: &str) -> crate::Result<()> {
        let url = self.url(&format!(
            "/api/zones/{}/equipment/{}",
            zone_id,
            urlencoding::encode(equipment)
        ));
        ensure_success(&url, self.http.delete(&url).await?)?;
        tracing::debug!("Deleted equipment '{}' from zone {}", equipment, zone_id);
        Ok(())
    }

    async fn compressor_data(&self) -> crate::Result<Vec<Sample>> {
        let url = self.url("/api/compresseur/data");
        let response = ensure_success(&url, self.http.get(&url).await?)?;
        let readings: Vec<RawReading> = decode(&url, &response.body)?;
        Ok(samples_from_readings(readings))
    }
}
