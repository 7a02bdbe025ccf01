//! Error taxonomy for the analysis pipeline.
//!
//! Two classes of problem exist:
//!
//! - **Fatal** structural problems with the primary sequence (empty input,
//!   a required channel missing, episodes out of order, invalid metric
//!   values, bad configuration). These are returned as [`AnalysisError`]
//!   and abort the stage that found them.
//! - **Recoverable** per-fit problems (short cycles, optimizer
//!   non-convergence). These never surface as `Err`; they are carried as
//!   [`crate::fitting::FitOutcome`] values next to the successful fits.

use thiserror::Error;

/// Fatal errors on the primary step sequence or configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The step sequence has zero records.
    #[error("step sequence is empty")]
    EmptyInput,
    /// A channel required by the requested analysis is absent.
    #[error("required field `{field}` is missing at episode {episode}")]
    MissingField { field: &'static str, episode: u64 },
    /// Episodes must be strictly increasing.
    #[error("episode {current} at index {index} does not follow episode {previous}")]
    NonMonotonicEpisode { index: usize, previous: u64, current: u64 },
    /// H and S must be finite and non-negative.
    #[error("invalid {field} = {value} at episode {episode}")]
    InvalidMetric { episode: u64, field: &'static str, value: f64 },
    /// A tunable parameter is outside its admissible range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
