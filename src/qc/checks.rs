//! Stateless quality-control test functions.
//!
//! Each test takes a value plus whatever context it needs and returns a
//! [`QcResult`]. Tests never fail as errors; a bad value produces a flag.

use chrono::{DateTime, Utc};

use crate::models::{Parameter, QcResult, QcTest, QualityFlag};
use crate::qc::limits::{limits_for, range_bounds};

/// Range test: parameter-specific bounds, latitude-adjusted for SST.
///
/// Out of range → flag 4, missing value → flag 9.
pub fn range_test(parameter: Parameter, value: Option<f64>, latitude: Option<f64>) -> QcResult {
    let (min, max) = range_bounds(parameter, latitude);

    let value = match value {
        Some(v) => v,
        None => {
            return QcResult {
                test: QcTest::Range,
                parameter,
                passed: false,
                flag: QualityFlag::Missing,
                statistic: None,
                threshold: None,
                message: format!("{} value missing", parameter.as_str()),
            }
        }
    };

    if value < min || value > max {
        QcResult {
            test: QcTest::Range,
            parameter,
            passed: false,
            flag: QualityFlag::Bad,
            statistic: Some(value),
            threshold: Some(if value < min { min } else { max }),
            message: format!(
                "{} value {:.2} outside range [{:.1}, {:.1}]",
                parameter.as_str(),
                value,
                min,
                max
            ),
        }
    } else {
        QcResult {
            test: QcTest::Range,
            parameter,
            passed: true,
            flag: QualityFlag::Good,
            statistic: Some(value),
            threshold: None,
            message: format!("range test passed ({:.2})", value),
        }
    }
}

/// Spike test: deviation from the average of the immediate temporal
/// neighbors. Requires both neighbors; otherwise the test is skipped.
pub fn spike_test(
    parameter: Parameter,
    value: f64,
    previous: Option<f64>,
    next: Option<f64>,
) -> QcResult {
    let threshold = match limits_for(parameter).spike_threshold {
        Some(t) => t,
        None => return QcResult::skipped(QcTest::Spike, parameter, "not applicable"),
    };

    let (prev, next) = match (previous, next) {
        (Some(p), Some(n)) => (p, n),
        _ => return QcResult::skipped(QcTest::Spike, parameter, "neighbor missing"),
    };

    let neighbor_avg = (prev + next) / 2.0;
    let deviation = (value - neighbor_avg).abs();

    let flag = if deviation > 2.0 * threshold {
        QualityFlag::Bad
    } else if deviation > threshold {
        QualityFlag::ProbablyBad
    } else {
        QualityFlag::Good
    };

    QcResult {
        test: QcTest::Spike,
        parameter,
        passed: flag == QualityFlag::Good,
        flag,
        statistic: Some(deviation),
        threshold: Some(threshold),
        message: if flag == QualityFlag::Good {
            format!("spike test passed (deviation {:.2})", deviation)
        } else {
            format!(
                "{} deviates {:.2} from neighbor average {:.2} (threshold {:.1})",
                parameter.as_str(),
                deviation,
                neighbor_avg,
                threshold
            )
        },
    }
}

/// Rate-of-change test: |Δvalue| / Δhours against a per-parameter ceiling.
pub fn rate_of_change_test(
    parameter: Parameter,
    value: f64,
    time: DateTime<Utc>,
    previous: Option<(f64, DateTime<Utc>)>,
) -> QcResult {
    let ceiling = match limits_for(parameter).rate_per_hour {
        Some(r) => r,
        None => return QcResult::skipped(QcTest::RateOfChange, parameter, "not applicable"),
    };

    let (prev_value, prev_time) = match previous {
        Some(p) => p,
        None => return QcResult::skipped(QcTest::RateOfChange, parameter, "no previous value"),
    };

    let elapsed_hours = (time - prev_time).num_seconds() as f64 / 3600.0;
    if elapsed_hours <= 0.0 {
        return QcResult::skipped(QcTest::RateOfChange, parameter, "non-positive time step");
    }

    let rate = (value - prev_value).abs() / elapsed_hours;

    let flag = if rate > 2.0 * ceiling {
        QualityFlag::Bad
    } else if rate > ceiling {
        QualityFlag::ProbablyBad
    } else {
        QualityFlag::Good
    };

    QcResult {
        test: QcTest::RateOfChange,
        parameter,
        passed: flag == QualityFlag::Good,
        flag,
        statistic: Some(rate),
        threshold: Some(ceiling),
        message: if flag == QualityFlag::Good {
            format!("rate-of-change test passed ({:.2}/h)", rate)
        } else {
            format!(
                "{} changed {:.2} per hour (ceiling {:.1})",
                parameter.as_str(),
                rate,
                ceiling
            )
        },
    }
}

/// Climatology test: z-score against a long-term mean and standard deviation.
///
/// |z| > 3 → flag 3, |z| > 4 → flag 4. A non-positive standard deviation
/// skips the test.
pub fn climatology_test(parameter: Parameter, value: f64, mean: f64, std_dev: f64) -> QcResult {
    if std_dev <= 0.0 {
        return QcResult::skipped(QcTest::Climatology, parameter, "non-positive std dev");
    }

    let z = (value - mean) / std_dev;

    let flag = if z.abs() > 4.0 {
        QualityFlag::Bad
    } else if z.abs() > 3.0 {
        QualityFlag::ProbablyBad
    } else {
        QualityFlag::Good
    };

    QcResult {
        test: QcTest::Climatology,
        parameter,
        passed: flag == QualityFlag::Good,
        flag,
        statistic: Some(z),
        threshold: Some(3.0),
        message: if flag == QualityFlag::Good {
            format!("climatology test passed (z = {:.2})", z)
        } else {
            format!(
                "{} value {:.2} is {:.1}σ from climatological mean {:.2}",
                parameter.as_str(),
                value,
                z.abs(),
                mean
            )
        },
    }
}

/// Spatial-consistency test: deviation from the mean of nearby-station
/// values for the same parameter and time.
pub fn spatial_consistency_test(parameter: Parameter, value: f64, neighbors: &[f64]) -> QcResult {
    let threshold = match limits_for(parameter).spatial_threshold {
        Some(t) => t,
        None => return QcResult::skipped(QcTest::SpatialConsistency, parameter, "not applicable"),
    };

    if neighbors.is_empty() {
        return QcResult::skipped(QcTest::SpatialConsistency, parameter, "no nearby values");
    }

    let neighbor_mean = neighbors.iter().sum::<f64>() / neighbors.len() as f64;
    let deviation = (value - neighbor_mean).abs();

    let flag = if deviation > 1.5 * threshold {
        QualityFlag::Bad
    } else if deviation > threshold {
        QualityFlag::ProbablyBad
    } else {
        QualityFlag::Good
    };

    QcResult {
        test: QcTest::SpatialConsistency,
        parameter,
        passed: flag == QualityFlag::Good,
        flag,
        statistic: Some(deviation),
        threshold: Some(threshold),
        message: if flag == QualityFlag::Good {
            format!("spatial test passed (deviation {:.2})", deviation)
        } else {
            format!(
                "{} deviates {:.2} from {} nearby stations (threshold {:.1})",
                parameter.as_str(),
                deviation,
                neighbors.len(),
                threshold
            )
        },
    }
}
