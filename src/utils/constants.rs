/// Missing-data sentinel tokens used by the realtime feed format
pub const MISSING_SENTINELS: [&str; 6] = ["MM", "99.0", "99.00", "999.0", "9999.0", "9999"];

/// Feed layout
pub const FEED_HEADER_LINES: usize = 2;
pub const FEED_MIN_FIELDS: usize = 19;
pub const FEED_WATER_TEMP_FIELD: usize = 14;

/// Two-digit years above this map to the 1900s
pub const CENTURY_PIVOT: u32 = 50;

/// Plausibility pre-filter for sea-surface temperature (°C)
pub const SST_PLAUSIBLE_MIN: f64 = -5.0;
pub const SST_PLAUSIBLE_MAX: f64 = 40.0;

/// Latitude-scaled SST ceiling: `SST_CEILING_BASE - SST_CEILING_LAT_SLOPE * |lat|`
pub const SST_CEILING_BASE: f64 = 35.0;
pub const SST_CEILING_LAT_SLOPE: f64 = 0.25;

/// Forecast horizon bounds (hours)
pub const MAX_FORECAST_HORIZON_HOURS: u32 = 336;
pub const SHORT_HORIZON_HOURS: u32 = 168;

/// Reliability decays linearly from this value at horizon 0 ...
pub const SKILL_AT_ZERO_HORIZON: f64 = 0.9;
/// ... to this value at the maximum horizon
pub const SKILL_AT_MAX_HORIZON: f64 = 0.5;

/// Spatial QC neighbor search radius (km)
pub const SPATIAL_NEIGHBOR_RADIUS_KM: f64 = 500.0;

/// Minimum historical window for forecasting
pub const DEFAULT_MIN_HISTORY: usize = 24;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
