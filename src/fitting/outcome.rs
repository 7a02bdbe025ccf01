//! Explicit result variants for fit attempts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a fit was not attempted
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SkipReason {
    #[error("cycle has {len} record(s), at least 2 are needed")]
    ShortCycle { len: usize },
    #[error("{observed} observation(s) cannot determine {parameters} parameters")]
    TooFewObservations { observed: usize, parameters: usize },
}

/// Why an attempted fit produced no parameters
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FitFailure {
    #[error("optimizer did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },
    #[error("model evaluation produced non-finite values")]
    NonFiniteModel,
    #[error("no grid candidate produced a finite loss")]
    NoFiniteCandidate,
}

/// Outcome of one fit attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum FitOutcome<T> {
    Fitted(T),
    Skipped(SkipReason),
    Failed(FitFailure),
}

impl<T> FitOutcome<T> {
    pub fn fitted(&self) -> Option<&T> {
        match self {
            FitOutcome::Fitted(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_fitted(self) -> Option<T> {
        match self {
            FitOutcome::Fitted(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self, FitOutcome::Fitted(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FitOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FitOutcome::Failed(_))
    }
}
