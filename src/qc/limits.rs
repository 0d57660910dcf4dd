use crate::models::Parameter;

/// Per-parameter quality-control limits.
///
/// `spike`, `rate` and `spatial` are `None` for parameters the corresponding
/// test does not apply to (e.g. wind direction wraps at 360°).
#[derive(Debug, Clone, Copy)]
pub struct QcLimits {
    pub min: f64,
    pub max: f64,
    pub spike_threshold: Option<f64>,
    pub rate_per_hour: Option<f64>,
    pub spatial_threshold: Option<f64>,
}

/// Limits table for every supported parameter.
pub fn limits_for(parameter: Parameter) -> QcLimits {
    match parameter {
        Parameter::SeaSurfaceTemperature => QcLimits {
            min: -5.0,
            max: 40.0,
            spike_threshold: Some(5.0),
            rate_per_hour: Some(2.0),
            spatial_threshold: Some(3.0),
        },
        Parameter::AirTemperature => QcLimits {
            min: -40.0,
            max: 50.0,
            spike_threshold: Some(10.0),
            rate_per_hour: Some(5.0),
            spatial_threshold: Some(5.0),
        },
        Parameter::Pressure => QcLimits {
            min: 870.0,
            max: 1085.0,
            spike_threshold: Some(10.0),
            rate_per_hour: Some(8.0),
            spatial_threshold: Some(8.0),
        },
        Parameter::WindSpeed => QcLimits {
            min: 0.0,
            max: 75.0,
            spike_threshold: Some(15.0),
            rate_per_hour: Some(20.0),
            spatial_threshold: Some(10.0),
        },
        Parameter::WindDirection => QcLimits {
            min: 0.0,
            max: 360.0,
            spike_threshold: None,
            rate_per_hour: None,
            spatial_threshold: None,
        },
        Parameter::WaveHeight => QcLimits {
            min: 0.0,
            max: 30.0,
            spike_threshold: Some(5.0),
            rate_per_hour: Some(3.0),
            spatial_threshold: Some(3.0),
        },
        Parameter::WavePeriod => QcLimits {
            min: 0.0,
            max: 30.0,
            spike_threshold: Some(8.0),
            rate_per_hour: Some(6.0),
            spatial_threshold: Some(5.0),
        },
        Parameter::Salinity => QcLimits {
            min: 0.0,
            max: 41.0,
            spike_threshold: Some(3.0),
            rate_per_hour: Some(1.0),
            spatial_threshold: Some(2.0),
        },
    }
}

/// Range bounds for a parameter, adjusted for the station's latitude.
///
/// Sea-surface temperature narrows to -2..15 °C poleward of 60° and
/// 10..35 °C in the tropics. Other parameters use the global bounds.
pub fn range_bounds(parameter: Parameter, latitude: Option<f64>) -> (f64, f64) {
    let limits = limits_for(parameter);

    if parameter == Parameter::SeaSurfaceTemperature {
        if let Some(lat) = latitude {
            if lat.abs() > 60.0 {
                return (-2.0, 15.0);
            }
            if lat.abs() < 23.5 {
                return (10.0, 35.0);
            }
        }
    }

    (limits.min, limits.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sst_latitude_bands() {
        assert_eq!(
            range_bounds(Parameter::SeaSurfaceTemperature, Some(70.0)),
            (-2.0, 15.0)
        );
        assert_eq!(
            range_bounds(Parameter::SeaSurfaceTemperature, Some(-65.0)),
            (-2.0, 15.0)
        );
        assert_eq!(
            range_bounds(Parameter::SeaSurfaceTemperature, Some(10.0)),
            (10.0, 35.0)
        );
        assert_eq!(
            range_bounds(Parameter::SeaSurfaceTemperature, Some(45.0)),
            (-5.0, 40.0)
        );
        assert_eq!(
            range_bounds(Parameter::SeaSurfaceTemperature, None),
            (-5.0, 40.0)
        );
    }

    #[test]
    fn test_latitude_does_not_affect_other_parameters() {
        assert_eq!(range_bounds(Parameter::Pressure, Some(70.0)), (870.0, 1085.0));
        assert_eq!(range_bounds(Parameter::WindSpeed, Some(5.0)), (0.0, 75.0));
    }

    #[test]
    fn test_wind_direction_has_range_only() {
        let limits = limits_for(Parameter::WindDirection);
        assert!(limits.spike_threshold.is_none());
        assert!(limits.rate_per_hour.is_none());
        assert!(limits.spatial_threshold.is_none());
    }
}
