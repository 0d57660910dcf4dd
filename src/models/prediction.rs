use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Family of forecast model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Autoregressive,
    Ensemble,
}

/// Fit metrics captured when a model version is registered or retrained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Registration record for one forecast model version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub id: String,
    pub kind: ModelKind,
    pub version: String,
    pub parameters: HashMap<String, f64>,
    pub metrics: ValidationMetrics,
    pub active: bool,
}

impl ModelMetadata {
    pub fn new(
        id: String,
        kind: ModelKind,
        version: String,
        parameters: HashMap<String, f64>,
        metrics: ValidationMetrics,
    ) -> Self {
        Self {
            id,
            kind,
            version,
            parameters,
            metrics,
            active: true,
        }
    }
}

/// Symmetric uncertainty bounds around a predicted value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictionUncertainty {
    pub std_dev: f64,
    pub lower_68: f64,
    pub upper_68: f64,
    pub lower_95: f64,
    pub upper_95: f64,
}

impl PredictionUncertainty {
    /// Build 68%/95% bounds from a point value and standard deviation.
    pub fn from_std_dev(value: f64, std_dev: f64) -> Self {
        Self {
            std_dev,
            lower_68: value - std_dev,
            upper_68: value + std_dev,
            lower_95: value - 1.96 * std_dev,
            upper_95: value + 1.96 * std_dev,
        }
    }
}

/// One forecast value for a single target hour. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Prediction {
    pub station_id: String,
    pub generated_at: DateTime<Utc>,
    pub target_time: DateTime<Utc>,

    #[validate(range(min = 1, max = 336))]
    pub horizon_hours: u32,

    pub value: f64,
    pub uncertainty: Option<PredictionUncertainty>,

    pub model_id: String,
    pub model_version: String,
    pub features_used: Vec<String>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub skill: f64,
}
