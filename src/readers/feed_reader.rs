use crate::error::{PipelineError, Result};
use crate::models::{Observation, QualityFlag};
use crate::utils::constants::{
    CENTURY_PIVOT, DEFAULT_BUFFER_SIZE, FEED_HEADER_LINES, FEED_MIN_FIELDS,
    FEED_WATER_TEMP_FIELD, MISSING_SENTINELS, SST_CEILING_BASE, SST_CEILING_LAT_SLOPE,
    SST_PLAUSIBLE_MAX, SST_PLAUSIBLE_MIN,
};
use chrono::{TimeZone, Utc};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Column positions in a realtime feed data line:
/// `YY MM DD hh mm WDIR WSPD GST WVHT DPD APD MWD PRES ATMP WTMP DEWP VIS PTDY TIDE`
const FIELD_WIND_DIRECTION: usize = 5;
const FIELD_WIND_SPEED: usize = 6;
const FIELD_WAVE_HEIGHT: usize = 8;
const FIELD_DOMINANT_PERIOD: usize = 9;
const FIELD_PRESSURE: usize = 12;
const FIELD_AIR_TEMP: usize = 13;

/// Parses the realtime2-style whitespace-delimited feed format into
/// observations. A line without a usable water temperature is dropped
/// entirely rather than emitted as a missing-data record.
pub struct FeedReader {
    use_mmap: bool,
    /// Station latitude for the plausibility pre-filter, when known.
    latitude: Option<f64>,
}

impl FeedReader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            latitude: None,
        }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self {
            use_mmap,
            latitude: None,
        }
    }

    pub fn with_latitude(mut self, latitude: Option<f64>) -> Self {
        self.latitude = latitude;
        self
    }

    /// Parse a complete raw feed into observations.
    ///
    /// The first two lines are the column-name and unit headers. Malformed
    /// data lines are skipped silently; only file-level I/O can fail, and
    /// this function takes text, so it is infallible.
    pub fn parse_feed(&self, station_id: &str, text: &str) -> Vec<Observation> {
        let mut observations = Vec::new();

        for (index, line) in text.lines().enumerate() {
            if index < FEED_HEADER_LINES {
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            if let Some(observation) = self.parse_data_line(station_id, line) {
                observations.push(observation);
            }
        }

        observations
    }

    /// Read a feed file, extracting the station ID from the filename
    /// (e.g. `41001.txt` -> `41001`).
    pub fn read_feed(&self, path: &Path) -> Result<Vec<Observation>> {
        let station_id = Self::extract_station_id_from_path(path)?;
        self.read_feed_with_station_id(path, &station_id)
    }

    /// Read a feed file with an explicit station ID.
    pub fn read_feed_with_station_id(
        &self,
        path: &Path,
        station_id: &str,
    ) -> Result<Vec<Observation>> {
        if self.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            let content = std::str::from_utf8(&mmap)
                .map_err(|e| PipelineError::FeedFormat(format!("Invalid UTF-8: {}", e)))?;
            Ok(self.parse_feed(station_id, content))
        } else {
            let file = File::open(path)?;
            let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            let mut content = String::new();
            std::io::Read::read_to_string(&mut reader, &mut content)?;
            Ok(self.parse_feed(station_id, &content))
        }
    }

    /// Extract the station ID from a feed filename (e.g. `46042.txt`).
    pub fn extract_station_id_from_path(path: &Path) -> Result<String> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                PipelineError::FeedFormat(format!(
                    "Cannot extract station ID from path: {}",
                    path.display()
                ))
            })
    }

    /// Parse one whitespace-delimited data line. Returns `None` for any line
    /// that is short, has a missing/unparseable water temperature, or an
    /// invalid date.
    fn parse_data_line(&self, station_id: &str, line: &str) -> Option<Observation> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < FEED_MIN_FIELDS {
            return None;
        }

        let water_temp = parse_field(fields[FEED_WATER_TEMP_FIELD])?;

        let year = parse_year(fields[0])?;
        let month: u32 = fields[1].parse().ok()?;
        let day: u32 = fields[2].parse().ok()?;
        let hour: u32 = fields[3].parse().ok()?;
        let minute: u32 = fields[4].parse().ok()?;

        let time = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()?;

        let mut observation = Observation::new(station_id.to_string(), time);
        observation.sea_surface_temperature = Some(water_temp);
        observation.wind_direction = parse_field(fields[FIELD_WIND_DIRECTION]);
        observation.wind_speed = parse_field(fields[FIELD_WIND_SPEED]);
        observation.wave_height = parse_field(fields[FIELD_WAVE_HEIGHT]);
        observation.wave_period = parse_field(fields[FIELD_DOMINANT_PERIOD]);
        observation.pressure = parse_field(fields[FIELD_PRESSURE]);
        observation.air_temperature = parse_field(fields[FIELD_AIR_TEMP]);
        observation.source = Some("NDBC".to_string());
        observation.flag = self.plausibility_flag(water_temp);

        Some(observation)
    }

    /// Coarse plausibility pre-filter, independent of the full QC suite:
    /// flag 1 when the temperature is inside the global band and under the
    /// latitude-scaled ceiling, flag 2 otherwise.
    fn plausibility_flag(&self, water_temp: f64) -> QualityFlag {
        let ceiling = SST_CEILING_BASE - SST_CEILING_LAT_SLOPE * self.latitude.unwrap_or(0.0).abs();

        let plausible = water_temp >= SST_PLAUSIBLE_MIN
            && water_temp <= SST_PLAUSIBLE_MAX
            && water_temp <= ceiling;

        if plausible {
            QualityFlag::Good
        } else {
            QualityFlag::ProbablyGood
        }
    }
}

impl Default for FeedReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a numeric field, treating sentinel tokens as missing.
fn parse_field(token: &str) -> Option<f64> {
    if MISSING_SENTINELS.contains(&token) {
        return None;
    }
    token.parse::<f64>().ok()
}

/// Two-digit years above the pivot are 1900s, at or below are 2000s.
/// Four-digit years pass through unchanged.
fn parse_year(token: &str) -> Option<i32> {
    let raw: u32 = token.parse().ok()?;
    if token.len() <= 2 {
        if raw > CENTURY_PIVOT {
            Some(1900 + raw as i32)
        } else {
            Some(2000 + raw as i32)
        }
    } else {
        Some(raw as i32)
    }
}
