use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Calendar-derived features for one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub day_of_year: u32,
    pub week_of_year: u32,
    pub annual_sin: f64,
    pub annual_cos: f64,
    pub diurnal_sin: f64,
    pub diurnal_cos: f64,
    pub is_weekend: bool,
}

/// Extract calendar features for an explicit instant.
pub fn calendar_features(as_of: DateTime<Utc>) -> CalendarFeatures {
    let day_of_week = as_of.weekday().num_days_from_monday();
    let day_of_year = as_of.ordinal();
    let hour = as_of.hour();

    let annual_phase = 2.0 * PI * day_of_year as f64 / 365.25;
    let diurnal_phase = 2.0 * PI * hour as f64 / 24.0;

    CalendarFeatures {
        year: as_of.year(),
        month: as_of.month(),
        day: as_of.day(),
        hour,
        day_of_week,
        day_of_year,
        week_of_year: as_of.iso_week().week(),
        annual_sin: annual_phase.sin(),
        annual_cos: annual_phase.cos(),
        diurnal_sin: diurnal_phase.sin(),
        diurnal_cos: diurnal_phase.cos(),
        is_weekend: day_of_week >= 5,
    }
}
