//! Value records flowing through the analysis pipeline.
//!
//! Everything here is plain data: a [`StepRecord`] comes in from the
//! collaborator that loads a run, the stages produce the other records.
//! The only field the core ever writes on an input record is
//! [`StepRecord::cycle`].

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::metrics::{action_entropy, wisdom_density};

/// One recorded step of the agent loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Monotonic step id
    pub episode: u64,
    /// Entropy-like scalar H
    pub h: f64,
    /// Density-like scalar S
    pub s: f64,
    /// Modularity Q (absent when not recorded)
    #[serde(default)]
    pub q: Option<f64>,
    #[serde(default)]
    pub terminated: bool,
    /// Cycle id attached by the segmenter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u32>,
}

impl StepRecord {
    pub fn new(episode: u64, h: f64, s: f64) -> Self {
        Self {
            episode,
            h,
            s,
            q: None,
            terminated: false,
            cycle: None,
        }
    }

    /// Derive H and S from a raw episode log: entropy of the actions taken,
    /// and successes normalized by steps and `capacity`.
    pub fn from_action_log(episode: u64, actions: &[usize], successes: usize, capacity: f64) -> Self {
        let h = action_entropy(actions);
        let s = wisdom_density(successes, actions.len(), capacity);
        Self::new(episode, h, s)
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = Some(q);
        self
    }

    pub fn terminated(mut self, terminated: bool) -> Self {
        self.terminated = terminated;
        self
    }

    /// Modularity, defaulting to 0.0 when the channel was not recorded.
    pub fn q_or_default(&self) -> f64 {
        self.q.unwrap_or(0.0)
    }
}

/// Check the structural guarantees every stage relies on.
///
/// The sequence must be non-empty, episodes strictly increasing, and
/// H/S finite and non-negative.
pub fn validate_sequence(records: &[StepRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    for (index, record) in records.iter().enumerate() {
        for (field, value) in [("h", record.h), ("s", record.s)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidMetric {
                    episode: record.episode,
                    field,
                    value,
                });
            }
        }

        if index > 0 {
            let previous = records[index - 1].episode;
            if record.episode <= previous {
                return Err(AnalysisError::NonMonotonicEpisode {
                    index,
                    previous,
                    current: record.episode,
                });
            }
        }
    }

    Ok(())
}

/// A maximal contiguous run of records between two change points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// 1-based, in traversal order
    pub cycle_id: u32,
    pub start_episode: u64,
    pub end_episode: u64,
    /// Index range of the member records in the analyzed sequence
    pub span: Range<usize>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    /// Member records of this cycle.
    pub fn members<'a>(&self, records: &'a [StepRecord]) -> &'a [StepRecord] {
        &records[self.span.clone()]
    }

    /// H trajectory of this cycle.
    pub fn h_values(&self, records: &[StepRecord]) -> Vec<f64> {
        self.members(records).iter().map(|r| r.h).collect()
    }
}

/// Regime symbol assigned by the event classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSymbol {
    /// Unexplored: low H, low S
    #[serde(rename = "∅")]
    Void,
    #[serde(rename = "Σ")]
    Stable,
    #[serde(rename = "Δ")]
    Volatile,
    /// Terminated with high S
    #[serde(rename = "Ω")]
    Integrated,
    /// S went down
    #[serde(rename = "⊖")]
    Regression,
    /// H rising right after a regression
    #[serde(rename = "≈")]
    Recovery,
}

impl EventSymbol {
    pub const ALL: [EventSymbol; 6] = [
        EventSymbol::Void,
        EventSymbol::Stable,
        EventSymbol::Volatile,
        EventSymbol::Integrated,
        EventSymbol::Regression,
        EventSymbol::Recovery,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            EventSymbol::Void => "∅",
            EventSymbol::Stable => "Σ",
            EventSymbol::Volatile => "Δ",
            EventSymbol::Integrated => "Ω",
            EventSymbol::Regression => "⊖",
            EventSymbol::Recovery => "≈",
        }
    }
}

impl fmt::Display for EventSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// A labeled step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub episode: u64,
    pub event: EventSymbol,
    pub h: f64,
    pub s: f64,
    pub q: f64,
}

/// Which smoothed channel jumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionReason {
    #[serde(rename = "H")]
    Entropy,
    #[serde(rename = "S")]
    Density,
    #[serde(rename = "H + S")]
    Both,
}

impl TransitionReason {
    /// Reason for the given trigger flags, `None` if neither fired.
    pub fn from_flags(h_jumped: bool, s_jumped: bool) -> Option<Self> {
        match (h_jumped, s_jumped) {
            (true, true) => Some(TransitionReason::Both),
            (true, false) => Some(TransitionReason::Entropy),
            (false, true) => Some(TransitionReason::Density),
            (false, false) => None,
        }
    }
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransitionReason::Entropy => "H",
            TransitionReason::Density => "S",
            TransitionReason::Both => "H + S",
        })
    }
}

/// Fine-grained jump on the smoothed H/S signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPoint {
    pub episode: u64,
    /// Unsmoothed H at this step
    pub h: f64,
    /// Unsmoothed S at this step
    pub s: f64,
    pub h_jump: f64,
    pub s_jump: f64,
    pub reason: TransitionReason,
}

/// Jump magnitudes at a cycle boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleTransition {
    pub episode: u64,
    pub h_diff: f64,
    pub s_diff: f64,
    pub terminated: bool,
}
