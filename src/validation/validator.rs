use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{JobRun, JobStatus, Observation, QcResult, QualityFlag, Station};
use crate::qc::{run_suite, QcContext};

/// A field-level problem found during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
        }
    }
}

/// Outcome of validating one record. Expected invalid input lands here as
/// accumulated errors and warnings; validation itself never fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldIssue>,
    pub warnings: Vec<FieldIssue>,
    pub flag: QualityFlag,
    pub qc_results: Vec<QcResult>,
}

impl ValidationReport {
    fn from_issues(errors: Vec<FieldIssue>, warnings: Vec<FieldIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            flag: QualityFlag::NotEvaluated,
            qc_results: Vec::new(),
        }
    }
}

/// Shape and business-rule validation over stations, observations and job
/// runs. Observation validation also runs the quality-control suite and
/// folds its outcome into the report.
pub struct Validator {
    /// Reject observation timestamps before this instant.
    earliest_observation: DateTime<Utc>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            earliest_observation: Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Validate station shape constraints and domain rules.
    pub fn validate_station(&self, station: &Station, now: DateTime<Utc>) -> ValidationReport {
        let mut errors = Vec::new();
        let warnings = Vec::new();

        if let Err(validation_errors) = station.validate() {
            for (field, field_errors) in validation_errors.field_errors() {
                for error in field_errors {
                    errors.push(FieldIssue::new(
                        field,
                        format!("constraint '{}' violated", error.code),
                    ));
                }
            }
        }

        if let Some(first) = station.first_observation {
            if first > now {
                errors.push(FieldIssue::new(
                    "first_observation",
                    format!("first observation {} is in the future", first),
                ));
            }
        }

        ValidationReport::from_issues(errors, warnings)
    }

    /// Validate one observation: shape rules, then the full QC suite.
    /// Flag-4 test results become errors, flag-3 become warnings.
    ///
    /// Deterministic for fixed inputs, so replays under at-least-once
    /// delivery are safe.
    pub fn validate_observation(
        &self,
        observation: &Observation,
        context: &QcContext,
        now: DateTime<Utc>,
    ) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if observation.station_id.trim().is_empty() {
            errors.push(FieldIssue::new("station_id", "must not be empty".to_string()));
        }

        if observation.time > now {
            errors.push(FieldIssue::new(
                "time",
                format!("observation time {} is in the future", observation.time),
            ));
        }
        if observation.time < self.earliest_observation {
            errors.push(FieldIssue::new(
                "time",
                format!("observation time {} predates 1900", observation.time),
            ));
        }

        for parameter in observation.present_parameters() {
            let Some(value) = observation.value(parameter) else {
                continue;
            };
            if !value.is_finite() {
                errors.push(FieldIssue::new(
                    parameter.as_str(),
                    "value must be finite".to_string(),
                ));
            }
        }

        let outcome = run_suite(observation, context);
        for result in &outcome.results {
            match result.flag {
                QualityFlag::Bad | QualityFlag::Missing => {
                    errors.push(FieldIssue::new(result.parameter.as_str(), result.message.clone()));
                }
                QualityFlag::ProbablyBad => {
                    warnings.push(FieldIssue::new(result.parameter.as_str(), result.message.clone()));
                }
                _ => {}
            }
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            flag: outcome.flag,
            qc_results: outcome.results,
        }
    }

    /// Validate job-run bookkeeping rules.
    pub fn validate_job_run(&self, job: &JobRun) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if job.source.trim().is_empty() {
            errors.push(FieldIssue::new("source", "must not be empty".to_string()));
        }

        if let Some(finished) = job.finished_at {
            if finished < job.started_at {
                errors.push(FieldIssue::new(
                    "finished_at",
                    "finish time precedes start time".to_string(),
                ));
            }
        }

        if job.status == JobStatus::Failed && job.error.is_none() {
            warnings.push(FieldIssue::new(
                "error",
                "failed job has no error message".to_string(),
            ));
        }

        if job.failure_rate() > 0.5 {
            warnings.push(FieldIssue::new(
                "rows_failed",
                format!(
                    "{} of {} rows failed ingestion",
                    job.rows_failed,
                    job.rows_ingested + job.rows_failed
                ),
            ));
        }

        ValidationReport::from_issues(errors, warnings)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
