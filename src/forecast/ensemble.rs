use crate::error::{PipelineError, Result};
use crate::forecast::{ForecastStep, Forecaster};
use std::sync::Arc;

/// Weighted combination of member forecasters.
///
/// Weights are fixed at construction and normalized at predict time; they
/// are never re-optimized per request. Point value, lower and upper bounds
/// are each combined independently per step.
pub struct EnsembleModel {
    name: String,
    members: Vec<(Arc<dyn Forecaster>, f64)>,
}

impl EnsembleModel {
    pub fn new(members: Vec<(Arc<dyn Forecaster>, f64)>) -> Result<Self> {
        if members.is_empty() {
            return Err(PipelineError::Forecast(
                "ensemble requires at least one member".to_string(),
            ));
        }
        if members.iter().any(|(_, w)| *w <= 0.0 || !w.is_finite()) {
            return Err(PipelineError::Forecast(
                "ensemble weights must be positive and finite".to_string(),
            ));
        }

        Ok(Self {
            name: "ensemble".to_string(),
            members,
        })
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl Forecaster for EnsembleModel {
    fn forecast(&self, series: &[f64], horizon: usize) -> Result<Vec<ForecastStep>> {
        let weight_sum: f64 = self.members.iter().map(|(_, w)| w).sum();

        let mut member_steps = Vec::with_capacity(self.members.len());
        for (model, weight) in &self.members {
            let steps = model.forecast(series, horizon)?;
            member_steps.push((steps, weight / weight_sum));
        }

        let mut combined = Vec::with_capacity(horizon);
        for index in 0..horizon {
            let mut value = 0.0;
            let mut lower = 0.0;
            let mut upper = 0.0;
            for (steps, weight) in &member_steps {
                value += steps[index].value * weight;
                lower += steps[index].lower * weight;
                upper += steps[index].upper * weight;
            }
            combined.push(ForecastStep {
                step: index + 1,
                value,
                lower,
                upper,
            });
        }

        Ok(combined)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
