//! Transition Detector: Thresholded Jumps on Smoothed Signals

use ndarray::Array1;
use tracing::debug;

use super::smoothing::moving_average;
use crate::config::TransitionConfig;
use crate::error::{AnalysisError, Result};
use crate::records::{validate_sequence, StepRecord, TransitionPoint, TransitionReason};

#[derive(Debug, Clone, Default)]
pub struct TransitionDetector {
    config: TransitionConfig,
}

impl TransitionDetector {
    pub fn new(config: TransitionConfig) -> Self {
        Self { config }
    }

    /// Smoothed (H, S) channels
    pub fn smoothed(&self, records: &[StepRecord]) -> (Array1<f64>, Array1<f64>) {
        let h: Array1<f64> = records.iter().map(|r| r.h).collect();
        let s: Array1<f64> = records.iter().map(|r| r.s).collect();
        (
            moving_average(h.view(), self.config.window),
            moving_average(s.view(), self.config.window),
        )
    }

    pub fn detect(&self, records: &[StepRecord]) -> Result<Vec<TransitionPoint>> {
        validate_sequence(records)?;
        if self.config.window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "smoothing window must be at least 1".into(),
            ));
        }

        let (h_smooth, s_smooth) = self.smoothed(records);
        let mut points = Vec::new();

        for i in 1..records.len() {
            let h_jump = (h_smooth[i] - h_smooth[i - 1]).abs();
            let s_jump = (s_smooth[i] - s_smooth[i - 1]).abs();

            let reason = TransitionReason::from_flags(
                h_jump > self.config.entropy_jump,
                s_jump > self.config.density_jump,
            );

            if let Some(reason) = reason {
                let record = &records[i];
                points.push(TransitionPoint {
                    episode: record.episode,
                    h: record.h,
                    s: record.s,
                    h_jump,
                    s_jump,
                    reason,
                });
            }
        }

        debug!(count = points.len(), window = self.config.window, "detected transition points");
        Ok(points)
    }
}
