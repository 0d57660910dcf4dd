pub mod memory;

pub use memory::{MemoryJobSink, MemoryStore};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{JobRun, Observation, Station};

/// Identifier handed out when a job run is opened.
pub type JobId = u64;

/// Backing store for stations and validated observations.
///
/// The pipeline only needs insert and time-range queries, so a real
/// database can replace the in-memory implementation without touching
/// pipeline logic.
pub trait ObservationStore: Send + Sync {
    /// Insert or refresh a station record.
    fn upsert_station(&self, station: Station) -> Result<()>;

    fn get_station(&self, station_id: &str) -> Result<Option<Station>>;

    /// Insert observations. Duplicate (station, time) pairs are ignored so
    /// replayed deliveries stay idempotent. Returns the number actually
    /// inserted.
    fn insert_observations(&self, observations: Vec<Observation>) -> Result<usize>;

    /// Observations for a station within [from, to], ordered by time.
    fn query(
        &self,
        station_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Observation>>;

    /// The most recent `count` observations at or before `as_of`, ordered
    /// oldest-first.
    fn latest(&self, station_id: &str, as_of: DateTime<Utc>, count: usize)
        -> Result<Vec<Observation>>;
}

/// Append-only sink for job bookkeeping. The pipeline writes exactly one
/// open and one completion per job and never reads job history back.
pub trait JobSink: Send + Sync {
    fn open(&self, job: JobRun) -> Result<JobId>;

    fn complete(&self, job_id: JobId, job: JobRun) -> Result<()>;
}
