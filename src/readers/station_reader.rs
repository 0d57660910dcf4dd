use crate::error::{PipelineError, Result};
use crate::models::{Provider, Station};
use crate::utils::coordinates::validate_coordinates;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct StationRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    provider: Option<String>,
}

/// Reads the CSV station directory (`id,name,latitude,longitude,provider`).
pub struct StationReader {
    skip_invalid: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_invalid: true }
    }

    pub fn with_skip_invalid(skip_invalid: bool) -> Self {
        Self { skip_invalid }
    }

    /// Read station metadata from a CSV directory file.
    pub fn read_stations(&self, path: &Path) -> Result<Vec<Station>> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut stations = Vec::new();
        for record in reader.deserialize::<StationRow>() {
            let row = match record {
                Ok(row) => row,
                Err(e) if self.skip_invalid => {
                    tracing::warn!("skipping malformed station row: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = validate_coordinates(row.latitude, row.longitude) {
                if self.skip_invalid {
                    tracing::warn!("skipping station {}: {}", row.id, e);
                    continue;
                }
                return Err(e);
            }

            let provider = row
                .provider
                .as_deref()
                .map(Provider::from_source)
                .unwrap_or(Provider::Unknown);

            stations.push(Station::new(
                row.id,
                row.name,
                row.latitude,
                row.longitude,
                provider,
            ));
        }

        Ok(stations)
    }

    /// Read station metadata keyed by station ID.
    pub fn read_stations_map(&self, path: &Path) -> Result<HashMap<String, Station>> {
        let stations = self.read_stations(path)?;
        let mut map = HashMap::with_capacity(stations.len());

        for station in stations {
            if map.insert(station.id.clone(), station).is_some() && !self.skip_invalid {
                return Err(PipelineError::FeedFormat(
                    "duplicate station id in directory".to_string(),
                ));
            }
        }

        Ok(map)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
