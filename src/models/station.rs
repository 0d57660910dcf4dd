use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Data provider a station reports through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ndbc,
    Erddap,
    International,
    Unknown,
}

impl Provider {
    pub fn from_source(source: &str) -> Self {
        match source.to_uppercase().as_str() {
            "NDBC" => Provider::Ndbc,
            "ERDDAP" => Provider::Erddap,
            "INTERNATIONAL" => Provider::International,
            _ => Provider::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ndbc => "NDBC",
            Provider::Erddap => "ERDDAP",
            Provider::International => "INTERNATIONAL",
            Provider::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Station {
    #[validate(length(min = 1))]
    pub id: String,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub provider: Provider,

    pub active: bool,

    pub first_observation: Option<DateTime<Utc>>,
    pub last_observation: Option<DateTime<Utc>>,
}

impl Station {
    pub fn new(id: String, name: String, latitude: f64, longitude: f64, provider: Provider) -> Self {
        Self {
            id,
            name,
            latitude,
            longitude,
            provider,
            active: true,
            first_observation: None,
            last_observation: None,
        }
    }

    /// Extend the observed time span to cover `time`.
    pub fn record_observation_time(&mut self, time: DateTime<Utc>) {
        match self.first_observation {
            Some(first) if first <= time => {}
            _ => self.first_observation = Some(time),
        }
        match self.last_observation {
            Some(last) if last >= time => {}
            _ => self.last_observation = Some(time),
        }
    }

    /// Refresh mutable metadata from a newer sighting. Identity is never changed.
    pub fn refresh_metadata(&mut self, name: String, latitude: f64, longitude: f64) {
        self.name = name;
        self.latitude = latitude;
        self.longitude = longitude;
    }

    /// Stations are deactivated, never deleted.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_polar(&self) -> bool {
        self.latitude.abs() > 60.0
    }

    pub fn is_tropical(&self) -> bool {
        self.latitude.abs() < 23.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_station_validation() {
        let station = Station::new(
            "41001".to_string(),
            "East Hatteras".to_string(),
            34.7,
            -72.7,
            Provider::Ndbc,
        );

        assert!(station.validate().is_ok());
        assert!(!station.is_polar());
        assert!(!station.is_tropical());
    }

    #[test]
    fn test_invalid_coordinates() {
        let station = Station::new(
            "41001".to_string(),
            "Bad Station".to_string(),
            91.0, // Invalid latitude
            -72.7,
            Provider::Ndbc,
        );

        assert!(station.validate().is_err());
    }

    #[test]
    fn test_observation_span_tracking() {
        let mut station = Station::new(
            "46042".to_string(),
            "Monterey".to_string(),
            36.8,
            -122.4,
            Provider::Ndbc,
        );

        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap();

        station.record_observation_time(t2);
        station.record_observation_time(t1);

        assert_eq!(station.first_observation, Some(t1));
        assert_eq!(station.last_observation, Some(t2));
    }

    #[test]
    fn test_deactivation() {
        let mut station = Station::new(
            "41001".to_string(),
            "East Hatteras".to_string(),
            34.7,
            -72.7,
            Provider::Ndbc,
        );

        station.deactivate();
        assert!(!station.active);
    }
}
