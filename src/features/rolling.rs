use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::features::lag::SeriesPoint;

/// Summary statistics over one trailing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RollingStats {
    pub window_hours: u32,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Mean/std/min/max over each requested trailing window ending at `as_of`.
///
/// Windows with no points are omitted from the result. Standard deviation is
/// the sample deviation; a single point yields 0.
pub fn rolling_features(
    series: &[SeriesPoint],
    as_of: DateTime<Utc>,
    windows: &[u32],
) -> Vec<RollingStats> {
    windows
        .iter()
        .filter_map(|&window_hours| {
            let start = as_of - Duration::hours(window_hours as i64);
            let values: Vec<f64> = series
                .iter()
                .filter(|(t, _)| *t > start && *t <= as_of)
                .map(|(_, v)| *v)
                .collect();

            if values.is_empty() {
                return None;
            }

            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            let std_dev = if count < 2 {
                0.0
            } else {
                let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (count - 1) as f64;
                variance.sqrt()
            };
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            Some(RollingStats {
                window_hours,
                mean,
                std_dev,
                min,
                max,
                count,
            })
        })
        .collect()
}
