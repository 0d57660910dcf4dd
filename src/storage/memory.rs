use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{PipelineError, Result};
use crate::models::{JobRun, Observation, Station};
use crate::storage::{JobId, JobSink, ObservationStore};

/// In-memory observation store used by the CLI and tests.
#[derive(Default)]
pub struct MemoryStore {
    stations: Mutex<HashMap<String, Station>>,
    /// Per station, observations keyed by timestamp.
    observations: Mutex<HashMap<String, BTreeMap<DateTime<Utc>, Observation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn station_count(&self) -> usize {
        self.stations.lock().expect("store lock poisoned").len()
    }

    pub fn observation_count(&self) -> usize {
        self.observations
            .lock()
            .expect("store lock poisoned")
            .values()
            .map(|series| series.len())
            .sum()
    }
}

impl ObservationStore for MemoryStore {
    fn upsert_station(&self, station: Station) -> Result<()> {
        let mut stations = self.stations.lock().expect("store lock poisoned");
        match stations.get_mut(&station.id) {
            Some(existing) => {
                existing.refresh_metadata(station.name, station.latitude, station.longitude);
                if let Some(first) = station.first_observation {
                    existing.record_observation_time(first);
                }
                if let Some(last) = station.last_observation {
                    existing.record_observation_time(last);
                }
            }
            None => {
                stations.insert(station.id.clone(), station);
            }
        }
        Ok(())
    }

    fn get_station(&self, station_id: &str) -> Result<Option<Station>> {
        Ok(self
            .stations
            .lock()
            .expect("store lock poisoned")
            .get(station_id)
            .cloned())
    }

    fn insert_observations(&self, observations: Vec<Observation>) -> Result<usize> {
        let mut store = self.observations.lock().expect("store lock poisoned");
        let mut inserted = 0;

        for observation in observations {
            let series = store.entry(observation.station_id.clone()).or_default();
            if let std::collections::btree_map::Entry::Vacant(entry) =
                series.entry(observation.time)
            {
                entry.insert(observation);
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    fn query(
        &self,
        station_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Observation>> {
        let store = self.observations.lock().expect("store lock poisoned");
        Ok(store
            .get(station_id)
            .map(|series| series.range(from..=to).map(|(_, o)| o.clone()).collect())
            .unwrap_or_default())
    }

    fn latest(
        &self,
        station_id: &str,
        as_of: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<Observation>> {
        let store = self.observations.lock().expect("store lock poisoned");
        let Some(series) = store.get(station_id) else {
            return Ok(Vec::new());
        };

        let mut recent: Vec<Observation> = series
            .range(..=as_of)
            .rev()
            .take(count)
            .map(|(_, o)| o.clone())
            .collect();
        recent.reverse();
        Ok(recent)
    }
}

/// In-memory job sink. Completion of a terminal job is rejected, keeping
/// the exactly-once bookkeeping contract observable in tests.
#[derive(Default)]
pub struct MemoryJobSink {
    next_id: AtomicU64,
    jobs: Mutex<HashMap<JobId, JobRun>>,
}

impl MemoryJobSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, job_id: JobId) -> Option<JobRun> {
        self.jobs
            .lock()
            .expect("job sink lock poisoned")
            .get(&job_id)
            .cloned()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().expect("job sink lock poisoned").len()
    }
}

impl JobSink for MemoryJobSink {
    fn open(&self, job: JobRun) -> Result<JobId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.jobs
            .lock()
            .expect("job sink lock poisoned")
            .insert(id, job);
        Ok(id)
    }

    fn complete(&self, job_id: JobId, job: JobRun) -> Result<()> {
        let mut jobs = self.jobs.lock().expect("job sink lock poisoned");
        let existing = jobs
            .get_mut(&job_id)
            .ok_or_else(|| PipelineError::Storage(format!("job {} not found", job_id)))?;

        if existing.status.is_terminal() {
            return Err(PipelineError::Storage(format!(
                "job {} already completed",
                job_id
            )));
        }
        if !job.status.is_terminal() {
            return Err(PipelineError::Storage(format!(
                "job {} completion must carry a terminal status",
                job_id
            )));
        }

        *existing = job;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use chrono::TimeZone;

    fn obs(station: &str, hour: u32, sst: f64) -> Observation {
        let time = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        let mut o = Observation::new(station.to_string(), time);
        o.sea_surface_temperature = Some(sst);
        o
    }

    #[test]
    fn test_insert_deduplicates_on_station_and_time() {
        let store = MemoryStore::new();

        let inserted = store
            .insert_observations(vec![obs("41001", 1, 18.0), obs("41001", 1, 18.0)])
            .unwrap();
        assert_eq!(inserted, 1);

        // Replay is a no-op
        let inserted = store.insert_observations(vec![obs("41001", 1, 18.0)]).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.observation_count(), 1);
    }

    #[test]
    fn test_query_range_ordered() {
        let store = MemoryStore::new();
        store
            .insert_observations(vec![
                obs("41001", 3, 19.0),
                obs("41001", 1, 18.0),
                obs("41001", 2, 18.5),
            ])
            .unwrap();

        let from = Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap();
        let results = store.query("41001", from, to).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].time < results[1].time);
    }

    #[test]
    fn test_latest_returns_oldest_first() {
        let store = MemoryStore::new();
        store
            .insert_observations(vec![
                obs("41001", 1, 18.0),
                obs("41001", 2, 18.5),
                obs("41001", 3, 19.0),
            ])
            .unwrap();

        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        let latest = store.latest("41001", as_of, 2).unwrap();

        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].sea_surface_temperature, Some(18.5));
        assert_eq!(latest[1].sea_surface_temperature, Some(19.0));
    }

    #[test]
    fn test_job_sink_exactly_once_completion() {
        let sink = MemoryJobSink::new();
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let job = JobRun::start("ndbc".to_string(), start);
        let id = sink.open(job.clone()).unwrap();

        let mut done = job.clone();
        done.succeed(start + chrono::Duration::minutes(5), 10, 0);
        sink.complete(id, done.clone()).unwrap();

        // Second completion is rejected
        assert!(sink.complete(id, done).is_err());
        assert_eq!(sink.get(id).unwrap().status, JobStatus::Ok);
    }

    #[test]
    fn test_station_upsert_refreshes_metadata() {
        let store = MemoryStore::new();
        let station = Station::new(
            "41001".to_string(),
            "East Hatteras".to_string(),
            34.7,
            -72.7,
            crate::models::Provider::Ndbc,
        );
        store.upsert_station(station.clone()).unwrap();

        let mut renamed = station;
        renamed.name = "East Hatteras II".to_string();
        store.upsert_station(renamed).unwrap();

        assert_eq!(store.station_count(), 1);
        assert_eq!(
            store.get_station("41001").unwrap().unwrap().name,
            "East Hatteras II"
        );
    }
}
