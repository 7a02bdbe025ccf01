//! Segmentation Module: Cycle Boundaries in the H/S Sequence
//!
//! A new cycle starts wherever the raw metrics move by more than a fixed
//! threshold between consecutive steps, or where the agent loop reported a
//! termination:
//!
//!   split(i) = |H(i) - H(i-1)| > θ_H  ∨  |S(i) - S(i-1)| > θ_S  ∨  terminated(i)
//!
//! Record 0 never splits, so cycle 1 always starts at the first step.
//!
//! Two consumers share the same predicate:
//!
//! - [`Segmenter`]: which cycle each step belongs to
//! - [`CycleTransitionDetector`]: what happened at each boundary
//!
//! Either can run without materializing the other.

mod change_point;
mod segmenter;
mod cycle_transitions;

pub use change_point::{ChangePoint, ChangePointRule, ChangePoints};
pub use segmenter::{Segmentation, Segmenter};
pub use cycle_transitions::CycleTransitionDetector;
