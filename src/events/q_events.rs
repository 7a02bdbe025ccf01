//! Q Events: Jumps in the Modularity Channel

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::QEventConfig;
use crate::error::{AnalysisError, Result};
use crate::records::{validate_sequence, StepRecord};

/// Direction of a modularity jump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QEventKind {
    /// Q fell: structure dissolving
    #[serde(rename = "∇")]
    Dissolution,
    /// Q rose: structure integrating
    #[serde(rename = "Ω")]
    Integration,
}

impl fmt::Display for QEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QEventKind::Dissolution => "∇",
            QEventKind::Integration => "Ω",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEvent {
    pub episode: u64,
    pub delta_q: f64,
    pub q: f64,
    pub kind: QEventKind,
}

/// Flags steps where |Q(t) - Q(t-1)| exceeds a threshold.
#[derive(Debug, Clone, Default)]
pub struct QEventDetector {
    config: QEventConfig,
}

impl QEventDetector {
    pub fn new(config: QEventConfig) -> Self {
        Self { config }
    }

    /// Requires every record to carry `q`.
    pub fn detect(&self, records: &[StepRecord]) -> Result<Vec<QEvent>> {
        validate_sequence(records)?;

        let mut q_values = Vec::with_capacity(records.len());
        for record in records {
            let q = record.q.ok_or(AnalysisError::MissingField {
                field: "modularity",
                episode: record.episode,
            })?;
            q_values.push(q);
        }

        let mut events = Vec::new();
        let mut prev_q = q_values[0];
        for (record, &q) in records.iter().zip(&q_values) {
            let delta_q = (q - prev_q).abs();
            if delta_q > self.config.q_threshold {
                events.push(QEvent {
                    episode: record.episode,
                    delta_q,
                    q,
                    kind: if q < prev_q {
                        QEventKind::Dissolution
                    } else {
                        QEventKind::Integration
                    },
                });
            }
            prev_q = q;
        }

        debug!(count = events.len(), "detected modularity events");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q_jumps_in_both_directions() {
        let records = vec![
            StepRecord::new(1, 0.5, 0.1).with_q(0.30),
            StepRecord::new(2, 0.5, 0.1).with_q(0.32),
            StepRecord::new(3, 0.5, 0.1).with_q(0.50),
            StepRecord::new(4, 0.5, 0.1).with_q(0.20),
        ];
        let events = QEventDetector::default().detect(&records).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].episode, 3);
        assert_eq!(events[0].kind, QEventKind::Integration);
        assert_eq!(events[1].kind, QEventKind::Dissolution);
        assert!((events[1].delta_q - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_missing_modularity_is_fatal() {
        let records = vec![
            StepRecord::new(1, 0.5, 0.1).with_q(0.3),
            StepRecord::new(2, 0.5, 0.1),
        ];
        let err = QEventDetector::default().detect(&records).unwrap_err();
        assert_eq!(err, AnalysisError::MissingField { field: "modularity", episode: 2 });
    }
}
