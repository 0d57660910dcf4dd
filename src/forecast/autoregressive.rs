use crate::error::{PipelineError, Result};
use crate::forecast::{ForecastStep, Forecaster};

/// ARIMA-shaped autoregressive model with a deliberately naive estimator.
///
/// Instead of a maximum-likelihood fit, the AR and MA coefficients are a
/// fixed decaying-weight set (`0.8·0.6^i` normalized to sum 0.95, and
/// `0.2·0.5^j`). This is a known approximation kept behind the
/// [`Forecaster`] trait so a proper estimator can replace it without
/// touching the ensemble or orchestrator.
#[derive(Debug, Clone)]
pub struct AutoregressiveModel {
    name: String,
    p: usize,
    d: usize,
    q: usize,
}

impl AutoregressiveModel {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        }
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Decaying AR weights, normalized so they sum to 0.95 and the
    /// recursion stays stationary.
    fn ar_coefficients(&self) -> Vec<f64> {
        if self.p == 0 {
            return Vec::new();
        }
        let raw: Vec<f64> = (0..self.p).map(|i| 0.8 * 0.6_f64.powi(i as i32)).collect();
        let sum: f64 = raw.iter().sum();
        raw.iter().map(|c| c * 0.95 / sum).collect()
    }

    fn ma_coefficients(&self) -> Vec<f64> {
        (0..self.q).map(|j| 0.2 * 0.5_f64.powi(j as i32)).collect()
    }

    /// One-step in-sample residuals of the AR recursion over a series.
    fn residuals(ar: &[f64], series: &[f64]) -> Vec<f64> {
        let p = ar.len();
        if series.len() <= p {
            return Vec::new();
        }

        (p..series.len())
            .map(|t| {
                let predicted: f64 = (0..p).map(|i| ar[i] * series[t - 1 - i]).sum();
                series[t] - predicted
            })
            .collect()
    }
}

impl Forecaster for AutoregressiveModel {
    fn forecast(&self, series: &[f64], horizon: usize) -> Result<Vec<ForecastStep>> {
        let min_len = self.p + self.d + 1;
        if series.len() < min_len {
            return Err(PipelineError::Forecast(format!(
                "{} needs at least {} observations, got {}",
                self.name,
                min_len,
                series.len()
            )));
        }

        // Difference d times, remembering the last value at each level for
        // integration afterwards.
        let mut work = series.to_vec();
        let mut integration_tails = Vec::with_capacity(self.d);
        for _ in 0..self.d {
            integration_tails.push(*work.last().expect("non-empty by length check"));
            work = work.windows(2).map(|w| w[1] - w[0]).collect();
        }

        let ar = self.ar_coefficients();
        let ma = self.ma_coefficients();
        let residuals = Self::residuals(&ar, &work);

        let base_variance = if residuals.is_empty() {
            0.0
        } else {
            let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
            residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / residuals.len() as f64
        };

        // Iterated forecast on the differenced scale. Future shocks are
        // zero; the last observed residuals feed the MA terms while they
        // remain in reach of the step index.
        let mut history = work;
        let mut differenced_forecasts = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let mut value = 0.0;
            for (i, coefficient) in ar.iter().enumerate() {
                if history.len() > i {
                    value += coefficient * history[history.len() - 1 - i];
                }
            }
            for (j, coefficient) in ma.iter().enumerate() {
                if j + 1 >= step {
                    let offset = j + 1 - step;
                    if offset < residuals.len() {
                        value += coefficient * residuals[residuals.len() - 1 - offset];
                    }
                }
            }
            history.push(value);
            differenced_forecasts.push(value);
        }

        // Integrate back to the original scale.
        let mut forecasts = differenced_forecasts;
        for tail in integration_tails.iter().rev() {
            let mut running = *tail;
            for value in forecasts.iter_mut() {
                running += *value;
                *value = running;
            }
        }

        Ok(forecasts
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let step = index + 1;
                let half_width = 1.96 * (step as f64 * base_variance).sqrt();
                ForecastStep {
                    step,
                    value,
                    lower: value - half_width,
                    upper: value + half_width,
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
