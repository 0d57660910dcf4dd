use serde::{Deserialize, Serialize};

use crate::features::lag::SeriesPoint;

/// Slope below this magnitude (per hour) counts as flat.
const DIRECTION_DEAD_BAND: f64 = 0.01;

/// Trend summary of a historical window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrendFeatures {
    /// OLS slope in value units per hour.
    pub slope_per_hour: f64,
    /// Second difference of the last three points.
    pub acceleration: f64,
    /// +1 rising, -1 falling, 0 flat.
    pub direction: i8,
}

/// Closed-form ordinary-least-squares slope plus curvature of the window.
///
/// Time is measured in hours from the first point, so the slope is in value
/// units per hour. Fewer than two points yield a flat trend.
pub fn trend_features(series: &[SeriesPoint]) -> TrendFeatures {
    if series.len() < 2 {
        return TrendFeatures {
            slope_per_hour: 0.0,
            acceleration: 0.0,
            direction: 0,
        };
    }

    let origin = series[0].0;
    let n = series.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for (t, v) in series {
        let x = (*t - origin).num_seconds() as f64 / 3600.0;
        sum_x += x;
        sum_y += v;
        sum_xy += x * v;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    let slope_per_hour = if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    };

    let acceleration = if series.len() >= 3 {
        let last = series[series.len() - 1].1;
        let mid = series[series.len() - 2].1;
        let first = series[series.len() - 3].1;
        last - 2.0 * mid + first
    } else {
        0.0
    };

    let direction = if slope_per_hour > DIRECTION_DEAD_BAND {
        1
    } else if slope_per_hour < -DIRECTION_DEAD_BAND {
        -1
    } else {
        0
    };

    TrendFeatures {
        slope_per_hour,
        acceleration,
        direction,
    }
}
