use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::features::{sst_series, FeatureConfig, FeatureSet};
use crate::forecast::ModelRegistry;
use crate::models::{Prediction, PredictionUncertainty};
use crate::storage::ObservationStore;
use crate::utils::constants::{
    DEFAULT_MIN_HISTORY, MAX_FORECAST_HORIZON_HOURS, SKILL_AT_MAX_HORIZON, SKILL_AT_ZERO_HORIZON,
};

/// A forecast request as received from the outer API surface.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub station_id: String,
    pub base_time: DateTime<Utc>,
    pub horizon_hours: u32,
    pub model_type: Option<String>,
    pub include_uncertainty: bool,
}

/// Selects a model for the requested horizon, wires the historical window
/// through feature extraction into the model, and shapes the output
/// contract: one prediction per integer hour, or an error. Never returns a
/// partial list.
pub struct PredictionService {
    registry: ModelRegistry,
    store: Arc<dyn ObservationStore>,
    feature_config: FeatureConfig,
    min_history: usize,
}

impl PredictionService {
    pub fn new(registry: ModelRegistry, store: Arc<dyn ObservationStore>) -> Self {
        Self {
            registry,
            store,
            feature_config: FeatureConfig::default(),
            min_history: DEFAULT_MIN_HISTORY,
        }
    }

    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history;
        self
    }

    pub fn predict(&self, request: &ForecastRequest) -> Result<Vec<Prediction>> {
        if request.horizon_hours == 0 || request.horizon_hours > MAX_FORECAST_HORIZON_HOURS {
            return Err(PipelineError::InvalidRequest(format!(
                "forecast horizon must be 1..={} hours, got {}",
                MAX_FORECAST_HORIZON_HOURS, request.horizon_hours
            )));
        }

        let model_id = match &request.model_type {
            Some(id) => id.as_str(),
            None => self.registry.id_for_horizon(request.horizon_hours),
        };
        let registered = self.registry.get(model_id)?;

        // Fetch enough history to cover the longest feature lag.
        let fetch_count = self
            .min_history
            .max(*self.feature_config.lag_hours.iter().max().unwrap_or(&0) as usize);
        let window = self
            .store
            .latest(&request.station_id, request.base_time, fetch_count)?;

        let series = sst_series(&window);
        if series.len() < self.min_history {
            return Err(PipelineError::InsufficientHistory {
                needed: self.min_history,
                available: series.len(),
            });
        }

        let features = FeatureSet::extract(&series, request.base_time, &self.feature_config);
        let features_used = features.names();

        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let steps = registered
            .model
            .forecast(&values, request.horizon_hours as usize)?;

        debug!(
            station = %request.station_id,
            model = model_id,
            horizon = request.horizon_hours,
            history = values.len(),
            "forecast computed"
        );

        let rmse = registered.metadata.metrics.rmse;
        let predictions = steps
            .into_iter()
            .map(|step| {
                let hour = step.step as u32;
                let uncertainty = request.include_uncertainty.then(|| {
                    let std_dev = rmse * (hour as f64 / 24.0).sqrt();
                    PredictionUncertainty::from_std_dev(step.value, std_dev)
                });

                Prediction {
                    station_id: request.station_id.clone(),
                    generated_at: request.base_time,
                    target_time: request.base_time + Duration::hours(hour as i64),
                    horizon_hours: hour,
                    value: step.value,
                    uncertainty,
                    model_id: registered.metadata.id.clone(),
                    model_version: registered.metadata.version.clone(),
                    features_used: features_used.clone(),
                    skill: reliability(hour),
                }
            })
            .collect();

        info!(
            station = %request.station_id,
            model = model_id,
            horizon = request.horizon_hours,
            "forecast issued"
        );

        Ok(predictions)
    }
}

/// Reliability decays linearly from 0.9 at horizon 0 to 0.5 at 14 days.
fn reliability(horizon_hours: u32) -> f64 {
    let fraction = horizon_hours as f64 / MAX_FORECAST_HORIZON_HOURS as f64;
    SKILL_AT_ZERO_HORIZON - (SKILL_AT_ZERO_HORIZON - SKILL_AT_MAX_HORIZON) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn seeded_store(hours: usize) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        let observations: Vec<Observation> = (0..hours)
            .map(|i| {
                let mut obs = Observation::new(
                    "41001".to_string(),
                    start + Duration::hours(i as i64),
                );
                obs.sea_surface_temperature =
                    Some(18.0 + ((i as f64) * 0.35).sin() * 0.8 + i as f64 * 0.005);
                obs
            })
            .collect();
        store.insert_observations(observations).unwrap();
        store
    }

    fn request(horizon: u32) -> ForecastRequest {
        ForecastRequest {
            station_id: "41001".to_string(),
            base_time: Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap(),
            horizon_hours: horizon,
            model_type: None,
            include_uncertainty: true,
        }
    }

    fn service(hours: usize) -> PredictionService {
        PredictionService::new(
            ModelRegistry::with_default_models().unwrap(),
            seeded_store(hours),
        )
    }

    #[test]
    fn test_one_prediction_per_hour() {
        let service = service(240);
        let predictions = service.predict(&request(24)).unwrap();

        assert_eq!(predictions.len(), 24);
        for (i, p) in predictions.iter().enumerate() {
            assert_eq!(p.horizon_hours, i as u32 + 1);
            assert_eq!(
                p.target_time,
                request(24).base_time + Duration::hours(i as i64 + 1)
            );
            assert_eq!(p.model_id, "ar-short");
        }
    }

    #[test]
    fn test_horizon_band_selects_ensemble() {
        let service = service(240);
        let predictions = service.predict(&request(200)).unwrap();

        assert_eq!(predictions.len(), 200);
        assert_eq!(predictions[0].model_id, "ensemble");
    }

    #[test]
    fn test_explicit_model_type_overrides() {
        let service = service(240);
        let mut req = request(24);
        req.model_type = Some("ar-long".to_string());

        let predictions = service.predict(&req).unwrap();
        assert_eq!(predictions[0].model_id, "ar-long");
    }

    #[test]
    fn test_unknown_model_is_fatal() {
        let service = service(240);
        let mut req = request(24);
        req.model_type = Some("gradient-boost".to_string());

        assert!(matches!(
            service.predict(&req),
            Err(PipelineError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_horizon_bounds() {
        let service = service(240);

        assert!(matches!(
            service.predict(&request(0)),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.predict(&request(337)),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(service.predict(&request(336)).is_ok());
    }

    #[test]
    fn test_insufficient_history() {
        let service = service(6);

        assert!(matches!(
            service.predict(&request(24)),
            Err(PipelineError::InsufficientHistory { .. })
        ));
    }

    #[test]
    fn test_uncertainty_grows_with_horizon() {
        let service = service(240);
        let predictions = service.predict(&request(48)).unwrap();

        let std_at = |h: usize| predictions[h - 1].uncertainty.unwrap().std_dev;

        assert!(std_at(48) > std_at(24));
        assert!(std_at(24) > std_at(1));
        // rmse * sqrt(24/24) at the 24-hour mark
        assert!((std_at(24) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_uncertainty_omitted_when_not_requested() {
        let service = service(240);
        let mut req = request(6);
        req.include_uncertainty = false;

        let predictions = service.predict(&req).unwrap();
        assert!(predictions.iter().all(|p| p.uncertainty.is_none()));
    }

    #[test]
    fn test_reliability_decay() {
        assert!((reliability(0) - 0.9).abs() < 1e-12);
        assert!((reliability(336) - 0.5).abs() < 1e-12);
        assert!((reliability(168) - 0.7).abs() < 1e-12);

        let service = service(240);
        let predictions = service.predict(&request(336)).unwrap();
        assert!((predictions[335].skill - 0.5).abs() < 1e-12);
        assert!(predictions[0].skill > predictions[335].skill);
    }
}
