//! Locally generated stand-in data for when the backend is unreachable

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::sample::Sample;
use crate::zone::Zone;

/// Number of samples in a generated series
pub const SYNTHETIC_LEN: usize = 100;

/// Spacing between generated samples
pub const SYNTHETIC_STEP_SECONDS: i64 = 20;

/// Zones shown when the registry cannot be loaded
pub fn mock_zones() -> Vec<Zone> {
    vec![
        Zone {
            id: 1,
            name: "Zone Production".to_string(),
            equipment: vec!["Compresseur 1".to_string(), "Pompe A".to_string()],
        },
        Zone {
            id: 2,
            name: "Zone Maintenance".to_string(),
            equipment: vec!["Compresseur 2".to_string(), "Ventilateur B".to_string()],
        },
    ]
}

/// Generate a series ending at `now`, one sample every 20 seconds
pub fn generate_series<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Vec<Sample> {
    (0..SYNTHETIC_LEN)
        .map(|i| {
            let back = (SYNTHETIC_LEN - 1 - i) as i64 * SYNTHETIC_STEP_SECONDS;
            let ts = now - Duration::seconds(back);
            Sample::new(
                Some(ts),
                rng.random_range(5.0..7.0),
                rng.random_range(10.0..15.0),
                rng.random_range(0.5..2.0),
                rng.random_range(0.4..1.6),
                rng.random_range(0.6..2.4),
            )
        })
        .collect()
}

/// Generate a series ending now
pub fn generate_series_now() -> Vec<Sample> {
    generate_series(Utc::now(), &mut rand::rng())
}
