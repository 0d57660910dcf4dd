pub mod ingestion;
pub mod prediction;

pub use ingestion::{IngestionService, JobReport, StationFeed};
pub use prediction::{ForecastRequest, PredictionService};

use crate::qc::Climatology;

/// External mapping from station id to (latitude, longitude).
pub trait CoordinateLookup: Send + Sync {
    fn coordinates(&self, station_id: &str) -> Option<(f64, f64)>;
}

/// External mapping from location and month to long-term statistics.
pub trait ClimatologyLookup: Send + Sync {
    fn climatology(&self, latitude: f64, longitude: f64, month: u32) -> Option<Climatology>;
}

/// Coordinate lookup backed by a station directory map.
pub struct DirectoryCoordinates(pub std::collections::HashMap<String, (f64, f64)>);

impl CoordinateLookup for DirectoryCoordinates {
    fn coordinates(&self, station_id: &str) -> Option<(f64, f64)> {
        self.0.get(station_id).copied()
    }
}

/// Lookups that report nothing; QC tests needing the context are skipped.
pub struct NoContext;

impl CoordinateLookup for NoContext {
    fn coordinates(&self, _station_id: &str) -> Option<(f64, f64)> {
        None
    }
}

impl ClimatologyLookup for NoContext {
    fn climatology(&self, _latitude: f64, _longitude: f64, _month: u32) -> Option<Climatology> {
        None
    }
}
