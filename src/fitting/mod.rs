//! Fitting Module: Parameter Estimation for the Reference Dynamics
//!
//! ## Logistic map (per cycle)
//!
//! For a cycle with entropy trajectory H(0..n), find
//!
//!   r̂ = argmin_{r ∈ grid} Σ_{t=1}^{n-1} (x_r(t) - H(t))²,   x_r(0) = H(0)
//!
//! by exhaustive search over an evenly spaced grid on [r_min, r_max]. The
//! map is chaotic over much of that interval, so the loss surface is
//! rugged and a derivative-free global scan is used instead of a local
//! optimizer.
//!
//! ## Logistic growth (whole run)
//!
//! For the density trajectory S(0..n), find (k, C, ε) within box bounds
//! minimizing Σ_t (S_model(t) - S(t))², with S_model integrated from
//! S(0) by RK4. Solved with a box-projected Levenberg–Marquardt iteration.
//!
//! ## Outcomes
//!
//! Neither fitter returns `Err`. Every attempt yields a [`FitOutcome`]:
//! fitted, skipped before trying, or failed while trying.

mod outcome;
mod logistic_map;
mod growth;

pub use outcome::{FitFailure, FitOutcome, SkipReason};
pub use logistic_map::{CycleFit, LogisticFitResult, LogisticMapFitter};
pub use growth::{GrowthFitResult, GrowthFitter};
