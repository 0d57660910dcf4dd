use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Physical parameters a buoy can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    SeaSurfaceTemperature,
    AirTemperature,
    Pressure,
    WindSpeed,
    WindDirection,
    WaveHeight,
    WavePeriod,
    Salinity,
}

impl Parameter {
    pub const ALL: [Parameter; 8] = [
        Parameter::SeaSurfaceTemperature,
        Parameter::AirTemperature,
        Parameter::Pressure,
        Parameter::WindSpeed,
        Parameter::WindDirection,
        Parameter::WaveHeight,
        Parameter::WavePeriod,
        Parameter::Salinity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::SeaSurfaceTemperature => "sea_surface_temperature",
            Parameter::AirTemperature => "air_temperature",
            Parameter::Pressure => "pressure",
            Parameter::WindSpeed => "wind_speed",
            Parameter::WindDirection => "wind_direction",
            Parameter::WaveHeight => "wave_height",
            Parameter::WavePeriod => "wave_period",
            Parameter::Salinity => "salinity",
        }
    }
}

/// IOC-style quality flag attached to an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityFlag {
    NotEvaluated = 0,
    Good = 1,
    ProbablyGood = 2,
    ProbablyBad = 3,
    Bad = 4,
    Missing = 9,
}

impl QualityFlag {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(QualityFlag::NotEvaluated),
            1 => Ok(QualityFlag::Good),
            2 => Ok(QualityFlag::ProbablyGood),
            3 => Ok(QualityFlag::ProbablyBad),
            4 => Ok(QualityFlag::Bad),
            9 => Ok(QualityFlag::Missing),
            _ => Err(PipelineError::InvalidQualityFlag(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Worst of two flags, by numeric code.
    pub fn max(self, other: QualityFlag) -> QualityFlag {
        if other.as_u8() > self.as_u8() {
            other
        } else {
            self
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, QualityFlag::Good | QualityFlag::ProbablyGood)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, QualityFlag::Bad | QualityFlag::Missing)
    }
}

/// One validated (or to-be-validated) reading from a station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub station_id: String,
    pub time: DateTime<Utc>,

    pub sea_surface_temperature: Option<f64>,
    pub air_temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wave_height: Option<f64>,
    pub wave_period: Option<f64>,
    pub salinity: Option<f64>,

    pub flag: QualityFlag,
    pub source: Option<String>,
    pub anomaly: Option<f64>,
}

impl Observation {
    pub fn new(station_id: String, time: DateTime<Utc>) -> Self {
        Self {
            station_id,
            time,
            sea_surface_temperature: None,
            air_temperature: None,
            pressure: None,
            wind_speed: None,
            wind_direction: None,
            wave_height: None,
            wave_period: None,
            salinity: None,
            flag: QualityFlag::NotEvaluated,
            source: None,
            anomaly: None,
        }
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::SeaSurfaceTemperature => self.sea_surface_temperature,
            Parameter::AirTemperature => self.air_temperature,
            Parameter::Pressure => self.pressure,
            Parameter::WindSpeed => self.wind_speed,
            Parameter::WindDirection => self.wind_direction,
            Parameter::WaveHeight => self.wave_height,
            Parameter::WavePeriod => self.wave_period,
            Parameter::Salinity => self.salinity,
        }
    }

    pub fn set_value(&mut self, parameter: Parameter, value: Option<f64>) {
        match parameter {
            Parameter::SeaSurfaceTemperature => self.sea_surface_temperature = value,
            Parameter::AirTemperature => self.air_temperature = value,
            Parameter::Pressure => self.pressure = value,
            Parameter::WindSpeed => self.wind_speed = value,
            Parameter::WindDirection => self.wind_direction = value,
            Parameter::WaveHeight => self.wave_height = value,
            Parameter::WavePeriod => self.wave_period = value,
            Parameter::Salinity => self.salinity = value,
        }
    }

    /// Parameters actually present on this observation.
    pub fn present_parameters(&self) -> Vec<Parameter> {
        Parameter::ALL
            .iter()
            .copied()
            .filter(|p| self.value(*p).is_some())
            .collect()
    }
}

/// The quality test that produced a [`QcResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QcTest {
    Range,
    Spike,
    RateOfChange,
    Climatology,
    SpatialConsistency,
}

impl QcTest {
    pub fn as_str(&self) -> &'static str {
        match self {
            QcTest::Range => "range",
            QcTest::Spike => "spike",
            QcTest::RateOfChange => "rate_of_change",
            QcTest::Climatology => "climatology",
            QcTest::SpatialConsistency => "spatial_consistency",
        }
    }
}

/// Outcome of a single quality test against one parameter value.
///
/// Diagnostic only; observations retain the aggregated flag, not the detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcResult {
    pub test: QcTest,
    pub parameter: Parameter,
    pub passed: bool,
    pub flag: QualityFlag,
    pub statistic: Option<f64>,
    pub threshold: Option<f64>,
    pub message: String,
}

impl QcResult {
    pub fn pass(test: QcTest, parameter: Parameter) -> Self {
        Self {
            test,
            parameter,
            passed: true,
            flag: QualityFlag::Good,
            statistic: None,
            threshold: None,
            message: format!("{} test passed", test.as_str()),
        }
    }

    /// A test whose required context was absent; retained for the record but
    /// excluded from flag aggregation.
    pub fn skipped(test: QcTest, parameter: Parameter, reason: &str) -> Self {
        Self {
            test,
            parameter,
            passed: true,
            flag: QualityFlag::NotEvaluated,
            statistic: None,
            threshold: None,
            message: format!("{} test skipped: {}", test.as_str(), reason),
        }
    }

    pub fn executed(&self) -> bool {
        self.flag != QualityFlag::NotEvaluated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_quality_flag_conversion() {
        assert_eq!(QualityFlag::from_u8(0).unwrap(), QualityFlag::NotEvaluated);
        assert_eq!(QualityFlag::from_u8(1).unwrap(), QualityFlag::Good);
        assert_eq!(QualityFlag::from_u8(4).unwrap(), QualityFlag::Bad);
        assert_eq!(QualityFlag::from_u8(9).unwrap(), QualityFlag::Missing);
        assert!(QualityFlag::from_u8(5).is_err());
    }

    #[test]
    fn test_flag_max_is_numeric() {
        assert_eq!(
            QualityFlag::Good.max(QualityFlag::Bad),
            QualityFlag::Bad
        );
        assert_eq!(
            QualityFlag::Missing.max(QualityFlag::Bad),
            QualityFlag::Missing
        );
        assert_eq!(
            QualityFlag::NotEvaluated.max(QualityFlag::Good),
            QualityFlag::Good
        );
    }

    #[test]
    fn test_parameter_accessors() {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut obs = Observation::new("41001".to_string(), time);

        obs.set_value(Parameter::SeaSurfaceTemperature, Some(18.5));
        obs.set_value(Parameter::WindSpeed, Some(7.2));

        assert_eq!(obs.value(Parameter::SeaSurfaceTemperature), Some(18.5));
        assert_eq!(obs.value(Parameter::Pressure), None);
        assert_eq!(
            obs.present_parameters(),
            vec![Parameter::SeaSurfaceTemperature, Parameter::WindSpeed]
        );
    }
}
