//! Segmenter: Cycle Labels for Every Step

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::change_point::ChangePointRule;
use crate::error::Result;
use crate::records::{validate_sequence, Cycle, StepRecord};

/// Result of labeling a sequence with cycle ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Total number of cycles (equals the last cycle id)
    pub cycle_count: u32,
    /// Cycles in traversal order
    pub cycles: Vec<Cycle>,
    /// Did the input already carry cycle ids that were replaced?
    pub overwrote_existing: bool,
}

impl Segmentation {
    pub fn cycle(&self, cycle_id: u32) -> Option<&Cycle> {
        self.cycles.get(cycle_id.checked_sub(1)? as usize)
    }
}

/// Attaches a cycle id to every record
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    rule: ChangePointRule,
}

impl Segmenter {
    pub fn new(rule: ChangePointRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &ChangePointRule {
        &self.rule
    }

    /// Label `records` in place and return the cycle layout.
    ///
    /// Existing `cycle` values are overwritten with a warning.
    pub fn segment(&self, records: &mut [StepRecord]) -> Result<Segmentation> {
        validate_sequence(records)?;

        let overwrote_existing = records.iter().any(|r| r.cycle.is_some());
        if overwrote_existing {
            warn!("records already carry cycle ids; overwriting");
        }

        let splits: Vec<usize> = self.rule.scan(records).map(|(index, _)| index).collect();

        let mut cycles = Vec::with_capacity(splits.len() + 1);
        let mut start = 0;
        for end in splits.iter().copied().chain(std::iter::once(records.len())) {
            let cycle_id = cycles.len() as u32 + 1;
            for record in &mut records[start..end] {
                record.cycle = Some(cycle_id);
            }
            cycles.push(Cycle {
                cycle_id,
                start_episode: records[start].episode,
                end_episode: records[end - 1].episode,
                span: start..end,
            });
            start = end;
        }

        let cycle_count = cycles.len() as u32;
        debug!(records = records.len(), cycle_count, "segmented sequence");

        Ok(Segmentation {
            cycle_count,
            cycles,
            overwrote_existing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn scenario() -> Vec<StepRecord> {
        vec![
            StepRecord::new(1, 0.1, 0.1),
            StepRecord::new(2, 0.1, 0.1),
            StepRecord::new(3, 0.9, 0.1).terminated(true),
            StepRecord::new(4, 0.1, 0.6),
        ]
    }

    #[test]
    fn test_scenario_yields_three_cycles() {
        let mut records = scenario();
        let seg = Segmenter::default().segment(&mut records).unwrap();

        assert_eq!(seg.cycle_count, 3);
        let ids: Vec<u32> = records.iter().map(|r| r.cycle.unwrap()).collect();
        assert_eq!(ids, vec![1, 1, 2, 3]);
        assert_eq!(seg.cycles[0].span, 0..2);
        assert_eq!(seg.cycles[1].start_episode, 3);
        assert_eq!(seg.cycles[2].end_episode, 4);
        assert!(!seg.overwrote_existing);
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let err = Segmenter::default().segment(&mut []).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
    }

    #[test]
    fn test_existing_cycles_overwritten() {
        let mut records = scenario();
        for r in &mut records {
            r.cycle = Some(42);
        }
        let seg = Segmenter::default().segment(&mut records).unwrap();

        assert!(seg.overwrote_existing);
        assert_eq!(records[0].cycle, Some(1));
        assert_eq!(records[3].cycle, Some(3));
    }

    #[test]
    fn test_terminate_split_disabled() {
        // Only termination separates these steps
        let mut records = vec![
            StepRecord::new(1, 0.5, 0.1),
            StepRecord::new(2, 0.5, 0.1).terminated(true),
            StepRecord::new(3, 0.5, 0.1),
        ];
        let with = Segmenter::default().segment(&mut records.clone()).unwrap();
        let without = Segmenter::new(ChangePointRule::new(0.002, 1e-6, false))
            .segment(&mut records)
            .unwrap();

        assert_eq!(with.cycle_count, 2);
        assert_eq!(without.cycle_count, 1);
    }

    #[test]
    fn test_cycle_lookup() {
        let mut records = scenario();
        let seg = Segmenter::default().segment(&mut records).unwrap();
        assert_eq!(seg.cycle(2).map(|c| c.len()), Some(1));
        assert!(seg.cycle(0).is_none());
        assert!(seg.cycle(4).is_none());
    }
}
