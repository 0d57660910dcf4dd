pub mod autoregressive;
pub mod ensemble;
pub mod registry;

pub use autoregressive::AutoregressiveModel;
pub use ensemble::EnsembleModel;
pub use registry::{ModelRegistry, RegisteredModel};

use crate::error::Result;

/// One step of a forecast: point value with 95% bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastStep {
    /// 1-based step index from the end of the input series.
    pub step: usize,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A model that can extend an ordered numeric series `horizon` steps ahead.
pub trait Forecaster: Send + Sync {
    fn forecast(&self, series: &[f64], horizon: usize) -> Result<Vec<ForecastStep>>;

    fn name(&self) -> &str;
}
