pub mod calendar;
pub mod lag;
pub mod rolling;
pub mod trend;

pub use calendar::{calendar_features, CalendarFeatures};
pub use lag::{lag_features, SeriesPoint};
pub use rolling::{rolling_features, RollingStats};
pub use trend::{trend_features, TrendFeatures};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Observation;

/// Which lags and rolling windows to derive.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub lag_hours: Vec<u32>,
    pub rolling_windows: Vec<u32>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lag_hours: vec![1, 6, 24, 48, 168],
            rolling_windows: vec![6, 24, 72, 168],
        }
    }
}

/// A named, flattened feature map derived from one station's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet {
    pub as_of: DateTime<Utc>,
    pub features: BTreeMap<String, f64>,
}

impl FeatureSet {
    /// Extract every feature family from an ordered (oldest-first) SST
    /// series. Pure: the only time read is the explicit `as_of`.
    pub fn extract(series: &[SeriesPoint], as_of: DateTime<Utc>, config: &FeatureConfig) -> Self {
        let mut features = BTreeMap::new();

        let cal = calendar_features(as_of);
        features.insert("year".to_string(), cal.year as f64);
        features.insert("month".to_string(), cal.month as f64);
        features.insert("day".to_string(), cal.day as f64);
        features.insert("hour".to_string(), cal.hour as f64);
        features.insert("day_of_week".to_string(), cal.day_of_week as f64);
        features.insert("day_of_year".to_string(), cal.day_of_year as f64);
        features.insert("week_of_year".to_string(), cal.week_of_year as f64);
        features.insert("annual_sin".to_string(), cal.annual_sin);
        features.insert("annual_cos".to_string(), cal.annual_cos);
        features.insert("diurnal_sin".to_string(), cal.diurnal_sin);
        features.insert("diurnal_cos".to_string(), cal.diurnal_cos);
        features.insert("is_weekend".to_string(), if cal.is_weekend { 1.0 } else { 0.0 });

        for (lag, value) in lag_features(series, as_of, &config.lag_hours) {
            features.insert(format!("lag_{}h", lag), value);
        }

        for stats in rolling_features(series, as_of, &config.rolling_windows) {
            features.insert(format!("rolling_mean_{}h", stats.window_hours), stats.mean);
            features.insert(format!("rolling_std_{}h", stats.window_hours), stats.std_dev);
            features.insert(format!("rolling_min_{}h", stats.window_hours), stats.min);
            features.insert(format!("rolling_max_{}h", stats.window_hours), stats.max);
        }

        let trend = trend_features(series);
        features.insert("trend_slope".to_string(), trend.slope_per_hour);
        features.insert("trend_acceleration".to_string(), trend.acceleration);
        features.insert("trend_direction".to_string(), trend.direction as f64);

        Self { as_of, features }
    }

    pub fn names(&self) -> Vec<String> {
        self.features.keys().cloned().collect()
    }
}

/// Pull the (time, SST) series out of an observation window, dropping
/// observations without a temperature.
pub fn sst_series(observations: &[Observation]) -> Vec<SeriesPoint> {
    observations
        .iter()
        .filter_map(|o| o.sea_surface_temperature.map(|v| (o.time, v)))
        .collect()
}
