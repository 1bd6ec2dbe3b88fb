use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("not enough data for lag {lag_days}d: {samples} paired samples, need at least 2")]
    InsufficientData { lag_days: i64, samples: usize },
    #[error("correlation undefined for lag {lag_days}d: one series is constant over {samples} samples")]
    ConstantSeries { lag_days: i64, samples: usize },
    #[error("no rows in the selected range")]
    EmptySeries,
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
