//! Transitions Module: Fine-Grained Jumps in Smoothed H/S
//!
//! Independent of cycle segmentation, both channels are passed through a
//! centered moving average of width w,
//!
//!   x̄(i) = mean{ x(j) : i - ⌊w/2⌋ ≤ j ≤ i - ⌊w/2⌋ + w - 1, 0 ≤ j < n }
//!
//! and a transition point is flagged wherever the smoothed signal moves by
//! more than a per-channel threshold between neighbours:
//!
//!   |H̄(i) - H̄(i-1)| > θ_H   or   |S̄(i) - S̄(i-1)| > θ_S
//!
//! Windows at the ends of the sequence are partial and average only the
//! samples that exist, so edges are noisier than the interior.

mod smoothing;
mod detector;

pub use smoothing::moving_average;
pub use detector::TransitionDetector;
