use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Feed format error: {0}")]
    FeedFormat(String),

    #[error("Station {station_id} not found")]
    StationNotFound { station_id: String },

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid quality flag: {0}")]
    InvalidQualityFlag(u8),

    #[error("Unknown forecast model: {0}")]
    UnknownModel(String),

    #[error("Invalid forecast request: {0}")]
    InvalidRequest(String),

    #[error("Insufficient history: need {needed} observations, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("Forecast error: {0}")]
    Forecast(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Processing cancelled by user")]
    Cancelled,

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
