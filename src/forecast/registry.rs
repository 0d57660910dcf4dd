use crate::error::{PipelineError, Result};
use crate::forecast::{AutoregressiveModel, EnsembleModel, Forecaster};
use crate::models::{ModelKind, ModelMetadata, ValidationMetrics};
use crate::utils::constants::SHORT_HORIZON_HOURS;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered model: its bookkeeping record plus the runnable forecaster.
#[derive(Clone)]
pub struct RegisteredModel {
    pub metadata: ModelMetadata,
    pub model: Arc<dyn Forecaster>,
}

/// Forecast models available to the orchestrator, keyed by id.
pub struct ModelRegistry {
    models: HashMap<String, RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// The stock model set: a short-horizon and long-horizon autoregressive
    /// model and an ensemble blending the two.
    pub fn with_default_models() -> Result<Self> {
        let mut registry = Self::new();

        let ar_short: Arc<dyn Forecaster> = Arc::new(AutoregressiveModel::new(3, 1, 1));
        let ar_long: Arc<dyn Forecaster> = Arc::new(AutoregressiveModel::new(2, 1, 0));
        let ensemble: Arc<dyn Forecaster> = Arc::new(EnsembleModel::new(vec![
            (ar_short.clone(), 0.6),
            (ar_long.clone(), 0.4),
        ])?);

        registry.register(
            ModelMetadata::new(
                "ar-short".to_string(),
                ModelKind::Autoregressive,
                "1.2.0".to_string(),
                HashMap::from([("p".to_string(), 3.0), ("d".to_string(), 1.0), ("q".to_string(), 1.0)]),
                ValidationMetrics {
                    mse: 0.64,
                    rmse: 0.8,
                    mae: 0.61,
                    r2: 0.91,
                },
            ),
            ar_short,
        );

        registry.register(
            ModelMetadata::new(
                "ar-long".to_string(),
                ModelKind::Autoregressive,
                "1.2.0".to_string(),
                HashMap::from([("p".to_string(), 2.0), ("d".to_string(), 1.0), ("q".to_string(), 0.0)]),
                ValidationMetrics {
                    mse: 2.25,
                    rmse: 1.5,
                    mae: 1.18,
                    r2: 0.74,
                },
            ),
            ar_long,
        );

        registry.register(
            ModelMetadata::new(
                "ensemble".to_string(),
                ModelKind::Ensemble,
                "1.1.0".to_string(),
                HashMap::from([("members".to_string(), 2.0)]),
                ValidationMetrics {
                    mse: 1.21,
                    rmse: 1.1,
                    mae: 0.86,
                    r2: 0.85,
                },
            ),
            ensemble,
        );

        Ok(registry)
    }

    pub fn register(&mut self, metadata: ModelMetadata, model: Arc<dyn Forecaster>) {
        self.models.insert(
            metadata.id.clone(),
            RegisteredModel { metadata, model },
        );
    }

    /// Look up a model by id. Unknown ids are a configuration error.
    pub fn get(&self, id: &str) -> Result<&RegisteredModel> {
        self.models
            .get(id)
            .filter(|m| m.metadata.active)
            .ok_or_else(|| PipelineError::UnknownModel(id.to_string()))
    }

    /// Pick the model id for a requested horizon band.
    pub fn id_for_horizon(&self, horizon_hours: u32) -> &'static str {
        if horizon_hours <= SHORT_HORIZON_HOURS {
            "ar-short"
        } else {
            "ensemble"
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.models.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
