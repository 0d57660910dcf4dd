pub mod job;
pub mod observation;
pub mod prediction;
pub mod station;

pub use job::{JobRun, JobStatus};
pub use observation::{Observation, Parameter, QcResult, QcTest, QualityFlag};
pub use prediction::{
    ModelKind, ModelMetadata, Prediction, PredictionUncertainty, ValidationMetrics,
};
pub use station::{Provider, Station};
