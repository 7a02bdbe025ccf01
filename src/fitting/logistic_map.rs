//! Logistic-Map Fitter: Grid Search for the Growth Rate r

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::outcome::{FitFailure, FitOutcome, SkipReason};
use crate::config::LogisticMapConfig;
use crate::records::StepRecord;
use crate::segmentation::Segmentation;
use crate::systems::{DynamicalSystem, LogisticMap};

/// Best-fit rate for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticFitResult {
    pub cycle_id: u32,
    /// Best-fit growth rate
    pub r: f64,
    /// Number of records in the cycle
    pub length: usize,
    pub start_episode: u64,
    pub end_episode: u64,
    /// Regenerated trajectory, H(0) followed by length - 1 iterates
    pub fitted: Vec<f64>,
    /// Sum of squared residuals over H[1..]
    pub sse: f64,
    pub rmse: f64,
}

/// Fit attempt for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleFit {
    pub cycle_id: u32,
    pub outcome: FitOutcome<LogisticFitResult>,
}

#[derive(Debug, Clone, Default)]
pub struct LogisticMapFitter {
    config: LogisticMapConfig,
}

impl LogisticMapFitter {
    pub fn new(config: LogisticMapConfig) -> Self {
        Self { config }
    }

    /// Candidate rates, endpoints included
    pub fn grid(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.config.resolution;
        let step = self.config.grid_step();
        (0..n).map(move |i| {
            if i + 1 == n {
                self.config.r_max
            } else {
                self.config.r_min + step * i as f64
            }
        })
    }

    /// Grid-search the rate that best reproduces `h` from `h[0]`.
    ///
    /// Returns `(r, sse)`; ties keep the smallest `r`. An empty `h` has no
    /// candidate.
    pub fn best_rate(&self, h: &[f64]) -> Result<(f64, f64), FitFailure> {
        let Some(&h0) = h.first() else {
            return Err(FitFailure::NoFiniteCandidate);
        };
        let mut map = LogisticMap::new(self.config.r_min, h0);
        let mut best: Option<(f64, f64)> = None;

        for r in self.grid() {
            map.set_rate(r);
            let loss = map.sum_squared_error(h);
            if !loss.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, best_loss)| loss < best_loss) {
                best = Some((r, loss));
            }
        }

        best.ok_or(FitFailure::NoFiniteCandidate)
    }

    /// Fit one H trajectory; `h` needs at least two samples.
    pub fn fit(&self, h: &[f64]) -> FitOutcome<(f64, Vec<f64>, f64)> {
        if h.len() < 2 {
            return FitOutcome::Skipped(SkipReason::ShortCycle { len: h.len() });
        }

        match self.best_rate(h) {
            Ok((r, sse)) => {
                let fitted = LogisticMap::new(r, h[0]).trajectory(h[0], h.len());
                FitOutcome::Fitted((r, fitted, sse))
            }
            Err(failure) => FitOutcome::Failed(failure),
        }
    }

    /// One [`CycleFit`] per cycle of `segmentation`, in cycle order.
    ///
    /// Short or unfittable cycles are reported and do not affect the others.
    pub fn fit_cycles(&self, records: &[StepRecord], segmentation: &Segmentation) -> Vec<CycleFit> {
        segmentation
            .cycles
            .iter()
            .map(|cycle| {
                let h = cycle.h_values(records);
                let outcome = match self.fit(&h) {
                    FitOutcome::Fitted((r, fitted, sse)) => {
                        let residuals = (h.len() - 1) as f64;
                        FitOutcome::Fitted(LogisticFitResult {
                            cycle_id: cycle.cycle_id,
                            r,
                            length: h.len(),
                            start_episode: cycle.start_episode,
                            end_episode: cycle.end_episode,
                            fitted,
                            sse,
                            rmse: (sse / residuals).sqrt(),
                        })
                    }
                    FitOutcome::Skipped(reason) => {
                        debug!(cycle = cycle.cycle_id, %reason, "skipping logistic fit");
                        FitOutcome::Skipped(reason)
                    }
                    FitOutcome::Failed(failure) => {
                        warn!(cycle = cycle.cycle_id, %failure, "logistic fit failed");
                        FitOutcome::Failed(failure)
                    }
                };
                CycleFit {
                    cycle_id: cycle.cycle_id,
                    outcome,
                }
            })
            .collect()
    }
}
