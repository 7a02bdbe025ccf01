//! Cycle-Transition Detector: Jump Magnitudes at Each Boundary

use tracing::debug;

use super::change_point::ChangePointRule;
use crate::error::Result;
use crate::records::{validate_sequence, CycleTransition, StepRecord};

/// Reports one [`CycleTransition`] per cycle boundary
#[derive(Debug, Clone, Default)]
pub struct CycleTransitionDetector {
    rule: ChangePointRule,
}

impl CycleTransitionDetector {
    pub fn new(rule: ChangePointRule) -> Self {
        Self { rule }
    }

    pub fn detect(&self, records: &[StepRecord]) -> Result<Vec<CycleTransition>> {
        validate_sequence(records)?;

        let transitions: Vec<CycleTransition> = self
            .rule
            .scan(records)
            .map(|(index, change)| CycleTransition {
                episode: records[index].episode,
                h_diff: change.h_diff,
                s_diff: change.s_diff,
                terminated: change.terminated,
            })
            .collect();

        debug!(count = transitions.len(), "detected cycle transitions");
        Ok(transitions)
    }
}
