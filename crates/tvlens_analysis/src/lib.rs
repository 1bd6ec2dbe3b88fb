pub mod chart;
pub mod correlation;
pub mod error;
pub mod interpretation;
pub mod merge;
pub mod summary;
pub mod timeframe;

pub use correlation::{CorrelationResult, STANDARD_LAGS, correlate};
pub use error::AnalysisError;
pub use merge::merge;
pub use timeframe::Timeframe;
