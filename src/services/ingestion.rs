use chrono::{DateTime, Datelike, Utc};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::models::{JobRun, JobStatus, Observation, Parameter, Provider, Station};
use crate::qc::QcContext;
use crate::readers::FeedReader;
use crate::services::{ClimatologyLookup, CoordinateLookup};
use crate::storage::{JobId, JobSink, ObservationStore};
use crate::utils::constants::SPATIAL_NEIGHBOR_RADIUS_KM;
use crate::utils::coordinates::haversine_distance;
use crate::validation::Validator;

/// One station's raw feed text, fetched by an external collaborator.
#[derive(Debug, Clone)]
pub struct StationFeed {
    pub station_id: String,
    pub text: String,
}

/// Summary of one ingestion invocation.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_id: JobId,
    pub status: JobStatus,
    pub rows_ingested: u64,
    pub rows_failed: u64,
    pub stations_processed: usize,
}

/// Parses, validates and stores feeds for a batch of stations under one
/// job run. Constructed explicitly with its collaborators; stations are
/// processed independently and may run in parallel.
pub struct IngestionService {
    store: Arc<dyn ObservationStore>,
    jobs: Arc<dyn JobSink>,
    coordinates: Arc<dyn CoordinateLookup>,
    climatology: Arc<dyn ClimatologyLookup>,
    validator: Validator,
    max_workers: usize,
}

impl IngestionService {
    pub fn new(
        store: Arc<dyn ObservationStore>,
        jobs: Arc<dyn JobSink>,
        coordinates: Arc<dyn CoordinateLookup>,
        climatology: Arc<dyn ClimatologyLookup>,
    ) -> Self {
        Self {
            store,
            jobs,
            coordinates,
            climatology,
            validator: Validator::new(),
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Run one ingestion job over pre-fetched feeds.
    ///
    /// The job run is opened once and completed exactly once; per-row
    /// failures accumulate in the counters and never fail the job.
    pub fn run_job(
        &self,
        source: &str,
        feeds: &[StationFeed],
        now: DateTime<Utc>,
    ) -> Result<JobReport> {
        let job_id = self.jobs.open(JobRun::start(source.to_string(), now))?;
        info!(source, stations = feeds.len(), "ingestion job started");

        let rows_ingested = AtomicU64::new(0);
        let rows_failed = AtomicU64::new(0);

        // Parse every feed up front so the spatial test can compare
        // stations against each other within the batch.
        let parsed: Vec<(String, Vec<Observation>)> = feeds
            .iter()
            .map(|feed| {
                let latitude = self
                    .coordinates
                    .coordinates(&feed.station_id)
                    .map(|(lat, _)| lat);
                let reader = FeedReader::new().with_latitude(latitude);
                (
                    feed.station_id.clone(),
                    reader.parse_feed(&feed.station_id, &feed.text),
                )
            })
            .collect();

        let neighbor_index = self.build_neighbor_index(&parsed);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let outcome: Result<Vec<()>> = pool.install(|| {
            parsed
                .par_iter()
                .map(|(station_id, observations)| {
                    let (ingested, failed) =
                        self.process_station(station_id, observations, &neighbor_index, now)?;
                    rows_ingested.fetch_add(ingested, Ordering::Relaxed);
                    rows_failed.fetch_add(failed, Ordering::Relaxed);
                    Ok(())
                })
                .collect()
        });

        let ingested = rows_ingested.load(Ordering::Relaxed);
        let failed = rows_failed.load(Ordering::Relaxed);

        let mut job = JobRun::start(source.to_string(), now);
        let status = match outcome {
            Ok(_) => {
                job.succeed(now, ingested, failed);
                JobStatus::Ok
            }
            Err(e) => {
                warn!(source, error = %e, "ingestion job failed");
                job.fail(now, ingested, failed, e.to_string());
                JobStatus::Failed
            }
        };
        self.jobs.complete(job_id, job)?;

        info!(
            source,
            rows_ingested = ingested,
            rows_failed = failed,
            ?status,
            "ingestion job completed"
        );

        Ok(JobReport {
            job_id,
            status,
            rows_ingested: ingested,
            rows_failed: failed,
            stations_processed: feeds.len(),
        })
    }

    /// SST values of all stations in the batch, grouped by timestamp, with
    /// the reporting station's coordinates for the distance cut.
    fn build_neighbor_index(
        &self,
        parsed: &[(String, Vec<Observation>)],
    ) -> HashMap<DateTime<Utc>, Vec<(String, f64, f64, f64)>> {
        let mut index: HashMap<DateTime<Utc>, Vec<(String, f64, f64, f64)>> = HashMap::new();

        for (station_id, observations) in parsed {
            let Some((lat, lon)) = self.coordinates.coordinates(station_id) else {
                continue;
            };
            for observation in observations {
                if let Some(sst) = observation.sea_surface_temperature {
                    index
                        .entry(observation.time)
                        .or_default()
                        .push((station_id.clone(), lat, lon, sst));
                }
            }
        }

        index
    }

    fn process_station(
        &self,
        station_id: &str,
        observations: &[Observation],
        neighbor_index: &HashMap<DateTime<Utc>, Vec<(String, f64, f64, f64)>>,
        now: DateTime<Utc>,
    ) -> Result<(u64, u64)> {
        let coordinates = self.coordinates.coordinates(station_id);

        if let Some((lat, lon)) = coordinates {
            let mut station = Station::new(
                station_id.to_string(),
                station_id.to_string(),
                lat,
                lon,
                Provider::Ndbc,
            );
            if let Some(first) = observations.first() {
                station.record_observation_time(first.time);
            }
            if let Some(last) = observations.last() {
                station.record_observation_time(last.time);
            }
            self.store.upsert_station(station)?;
        }

        let mut sorted: Vec<Observation> = observations.to_vec();
        sorted.sort_by_key(|o| o.time);

        let mut accepted = Vec::with_capacity(sorted.len());
        let mut failed: u64 = 0;

        for index in 0..sorted.len() {
            let observation = &sorted[index];

            let climatology = coordinates.and_then(|(lat, lon)| {
                self.climatology
                    .climatology(lat, lon, observation.time.month())
            });

            let neighbor_values = coordinates
                .map(|(lat, lon)| {
                    let values: Vec<f64> = neighbor_index
                        .get(&observation.time)
                        .map(|entries| {
                            entries
                                .iter()
                                .filter(|(id, n_lat, n_lon, _)| {
                                    id != station_id
                                        && haversine_distance(lat, lon, *n_lat, *n_lon)
                                            <= SPATIAL_NEIGHBOR_RADIUS_KM
                                })
                                .map(|(_, _, _, sst)| *sst)
                                .collect()
                        })
                        .unwrap_or_default();
                    if values.is_empty() {
                        Vec::new()
                    } else {
                        vec![(Parameter::SeaSurfaceTemperature, values)]
                    }
                })
                .unwrap_or_default();

            let context = QcContext {
                latitude: coordinates.map(|(lat, _)| lat),
                previous: (index > 0).then(|| sorted[index - 1].clone()),
                next: sorted.get(index + 1).cloned(),
                neighbor_values,
                climatology,
            };

            let report = self.validator.validate_observation(observation, &context, now);

            if report.is_valid {
                let mut validated = observation.clone();
                // The pre-filter flag survives when it is worse than the
                // QC outcome.
                validated.flag = validated.flag.max(report.flag);
                if let Some(clim) = climatology {
                    validated.anomaly = validated
                        .sea_surface_temperature
                        .map(|sst| sst - clim.mean);
                }
                accepted.push(validated);
            } else {
                debug!(
                    station = station_id,
                    time = %observation.time,
                    errors = report.errors.len(),
                    "observation rejected"
                );
                failed += 1;
            }
        }

        let inserted = self.store.insert_observations(accepted)? as u64;
        Ok((inserted, failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NoContext;
    use crate::storage::{MemoryJobSink, MemoryStore};
    use chrono::TimeZone;

    const HEADER: &str = "#YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE\n#yr  mo dy hr mn degT m/s  m/s     m   sec   sec degT   hPa  degC  degC  degC  nmi  hPa    ft\n";

    fn feed_line(hour: u32, sst: &str) -> String {
        format!(
            "2024 06 01 {:02} 00 230 7.2 9.1 1.2 8 6.4 240 1015.2 19.1 {} 15.0 99.0 -1.1 99.00",
            hour, sst
        )
    }

    fn service() -> (Arc<MemoryStore>, Arc<MemoryJobSink>, IngestionService) {
        let store = Arc::new(MemoryStore::new());
        let jobs = Arc::new(MemoryJobSink::new());
        let service = IngestionService::new(
            store.clone(),
            jobs.clone(),
            Arc::new(NoContext),
            Arc::new(NoContext),
        )
        .with_max_workers(2);
        (store, jobs, service)
    }

    #[test]
    fn test_job_ingests_valid_feed() {
        let (store, jobs, service) = service();
        let text = format!("{}{}\n{}\n", HEADER, feed_line(10, "18.5"), feed_line(11, "18.7"));
        let feeds = vec![StationFeed {
            station_id: "41001".to_string(),
            text,
        }];
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

        let report = service.run_job("ndbc", &feeds, now).unwrap();

        assert_eq!(report.status, JobStatus::Ok);
        assert_eq!(report.rows_ingested, 2);
        assert_eq!(report.rows_failed, 0);
        assert_eq!(store.observation_count(), 2);
        assert_eq!(jobs.get(report.job_id).unwrap().status, JobStatus::Ok);
    }

    #[test]
    fn test_rejected_rows_counted_not_fatal() {
        let (store, _jobs, service) = service();
        // Second line carries an impossible temperature: range test flag 4
        let text = format!("{}{}\n{}\n", HEADER, feed_line(10, "18.5"), feed_line(11, "55.0"));
        let feeds = vec![StationFeed {
            station_id: "41001".to_string(),
            text,
        }];
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

        let report = service.run_job("ndbc", &feeds, now).unwrap();

        assert_eq!(report.status, JobStatus::Ok);
        assert_eq!(report.rows_ingested, 1);
        assert_eq!(report.rows_failed, 1);
        assert_eq!(store.observation_count(), 1);
    }

    #[test]
    fn test_replay_is_idempotent() {
        let (store, _jobs, service) = service();
        let text = format!("{}{}\n", HEADER, feed_line(10, "18.5"));
        let feeds = vec![StationFeed {
            station_id: "41001".to_string(),
            text,
        }];
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

        let first = service.run_job("ndbc", &feeds, now).unwrap();
        let second = service.run_job("ndbc", &feeds, now).unwrap();

        assert_eq!(first.rows_ingested, 1);
        // Same delivery again: deduplicated by the store
        assert_eq!(second.rows_ingested, 0);
        assert_eq!(store.observation_count(), 1);
    }

    #[test]
    fn test_stations_process_independently() {
        let (store, _jobs, service) = service();
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let feeds: Vec<StationFeed> = ["41001", "46042", "44013"]
            .iter()
            .map(|id| StationFeed {
                station_id: id.to_string(),
                text: format!("{}{}\n", HEADER, feed_line(10, "18.5")),
            })
            .collect();

        let report = service.run_job("ndbc", &feeds, now).unwrap();

        assert_eq!(report.stations_processed, 3);
        assert_eq!(report.rows_ingested, 3);
        assert_eq!(store.observation_count(), 3);
    }
}
