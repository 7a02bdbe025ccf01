//! Change-Point Predicate: Threshold Test on Consecutive Steps

use crate::config::SegmentationConfig;
use crate::records::StepRecord;

/// Jump magnitudes at a detected split
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangePoint {
    /// |H(i) - H(i-1)|
    pub h_diff: f64,
    /// |S(i) - S(i-1)|
    pub s_diff: f64,
    /// Termination flag of the split record
    pub terminated: bool,
}

/// Thresholds deciding where a new cycle begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangePointRule {
    pub h_threshold: f64,
    pub s_threshold: f64,
    pub split_on_terminate: bool,
}

impl ChangePointRule {
    pub fn new(h_threshold: f64, s_threshold: f64, split_on_terminate: bool) -> Self {
        Self {
            h_threshold,
            s_threshold,
            split_on_terminate,
        }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.h_threshold, config.s_threshold, config.split_on_terminate)
    }

    /// Test one record against the previous H/S values.
    ///
    /// Returns the jump magnitudes when any trigger fires.
    pub fn evaluate(&self, last_h: f64, last_s: f64, record: &StepRecord) -> Option<ChangePoint> {
        let h_diff = (record.h - last_h).abs();
        let s_diff = (record.s - last_s).abs();

        let split = h_diff > self.h_threshold
            || s_diff > self.s_threshold
            || (self.split_on_terminate && record.terminated);

        split.then_some(ChangePoint {
            h_diff,
            s_diff,
            terminated: record.terminated,
        })
    }

    /// Iterate the splits of a sequence in order.
    pub fn scan<'a>(&self, records: &'a [StepRecord]) -> ChangePoints<'a> {
        ChangePoints::new(*self, records)
    }
}

impl Default for ChangePointRule {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}

/// Iterator over `(index, ChangePoint)` for every split record.
///
/// The reference H/S advance on every record, split or not.
pub struct ChangePoints<'a> {
    rule: ChangePointRule,
    records: &'a [StepRecord],
    index: usize,
    last_h: f64,
    last_s: f64,
}

impl<'a> ChangePoints<'a> {
    fn new(rule: ChangePointRule, records: &'a [StepRecord]) -> Self {
        let (last_h, last_s) = records.first().map(|r| (r.h, r.s)).unwrap_or((0.0, 0.0));
        Self {
            rule,
            records,
            // Record 0 is compared against itself and can never split
            index: 1,
            last_h,
            last_s,
        }
    }
}

impl Iterator for ChangePoints<'_> {
    type Item = (usize, ChangePoint);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.records.len() {
            let index = self.index;
            let record = &self.records[index];
            let split = self.rule.evaluate(self.last_h, self.last_s, record);

            self.last_h = record.h;
            self.last_s = record.s;
            self.index += 1;

            if let Some(change) = split {
                return Some((index, change));
            }
        }
        None
    }
}
