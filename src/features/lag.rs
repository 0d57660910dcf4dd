use chrono::{DateTime, Duration, Utc};

/// One (time, value) point of an ordered historical series.
pub type SeriesPoint = (DateTime<Utc>, f64);

/// Value at each requested lag offset, in hours before `as_of`.
///
/// The series must be ordered oldest-first. When the window does not reach
/// back far enough for a lag, the oldest available value is used instead.
/// Returns one `(lag_hours, value)` pair per requested lag; an empty series
/// yields no pairs.
pub fn lag_features(series: &[SeriesPoint], as_of: DateTime<Utc>, lags: &[u32]) -> Vec<(u32, f64)> {
    let Some(oldest) = series.first() else {
        return Vec::new();
    };

    lags.iter()
        .map(|&lag| {
            let target = as_of - Duration::hours(lag as i64);
            let value = if target < oldest.0 {
                oldest.1
            } else {
                // Latest point at or before the target time.
                series
                    .iter()
                    .rev()
                    .find(|(t, _)| *t <= target)
                    .map(|(_, v)| *v)
                    .unwrap_or(oldest.1)
            };
            (lag, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hourly_series(start_hour: u32, values: &[f64]) -> Vec<SeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                (
                    Utc.with_ymd_and_hms(2024, 6, 1, start_hour + i as u32, 0, 0)
                        .unwrap(),
                    v,
                )
            })
            .collect()
    }

    #[test]
    fn test_exact_lag_lookup() {
        let series = hourly_series(0, &[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 5, 0, 0).unwrap();

        let lags = lag_features(&series, as_of, &[1, 3]);

        assert_eq!(lags, vec![(1, 14.0), (3, 12.0)]);
    }

    #[test]
    fn test_lag_beyond_window_falls_back_to_oldest() {
        let series = hourly_series(0, &[10.0, 11.0, 12.0]);
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap();

        let lags = lag_features(&series, as_of, &[24, 168]);

        assert_eq!(lags, vec![(24, 10.0), (168, 10.0)]);
    }

    #[test]
    fn test_empty_series() {
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap();
        assert!(lag_features(&[], as_of, &[1, 6]).is_empty());
    }
}
