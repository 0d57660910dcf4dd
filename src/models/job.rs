use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Ok,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ok | JobStatus::Failed)
    }
}

/// Bookkeeping record for one ingestion invocation.
///
/// Written exactly twice: once at start, once at completion. Terminal state
/// is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub rows_ingested: u64,
    pub rows_failed: u64,
    pub error: Option<String>,
}

impl JobRun {
    pub fn start(source: String, started_at: DateTime<Utc>) -> Self {
        Self {
            source,
            started_at,
            finished_at: None,
            status: JobStatus::Running,
            rows_ingested: 0,
            rows_failed: 0,
            error: None,
        }
    }

    pub fn succeed(&mut self, finished_at: DateTime<Utc>, rows_ingested: u64, rows_failed: u64) {
        debug_assert!(!self.status.is_terminal());
        self.finished_at = Some(finished_at);
        self.status = JobStatus::Ok;
        self.rows_ingested = rows_ingested;
        self.rows_failed = rows_failed;
    }

    pub fn fail(
        &mut self,
        finished_at: DateTime<Utc>,
        rows_ingested: u64,
        rows_failed: u64,
        error: String,
    ) {
        debug_assert!(!self.status.is_terminal());
        self.finished_at = Some(finished_at);
        self.status = JobStatus::Failed;
        self.rows_ingested = rows_ingested;
        self.rows_failed = rows_failed;
        self.error = Some(error);
    }

    /// Fraction of processed rows that were rejected, in [0, 1].
    pub fn failure_rate(&self) -> f64 {
        let total = self.rows_ingested + self.rows_failed;
        if total == 0 {
            0.0
        } else {
            self.rows_failed as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_job_lifecycle() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 5, 0).unwrap();

        let mut job = JobRun::start("ndbc".to_string(), start);
        assert_eq!(job.status, JobStatus::Running);
        assert!(!job.status.is_terminal());

        job.succeed(end, 120, 3);
        assert_eq!(job.status, JobStatus::Ok);
        assert_eq!(job.finished_at, Some(end));
        assert_eq!(job.rows_ingested, 120);
    }

    #[test]
    fn test_failed_job_records_error() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 1, 0).unwrap();

        let mut job = JobRun::start("ndbc".to_string(), start);
        job.fail(end, 10, 2, "feed unreachable".to_string());

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("feed unreachable"));
    }

    #[test]
    fn test_failure_rate() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut job = JobRun::start("ndbc".to_string(), start);
        job.rows_ingested = 40;
        job.rows_failed = 60;

        assert!((job.failure_rate() - 0.6).abs() < 1e-12);

        let empty = JobRun::start("ndbc".to_string(), start);
        assert_eq!(empty.failure_rate(), 0.0);
    }
}
