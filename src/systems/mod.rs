//! Systems Module: Reference Dynamics for the H and S Channels
//!
//! Two low-dimensional models describe how the recorded metrics evolve:
//!
//! - **Logistic map** (discrete, per cycle): x(t+1) = r·x(t)·(1 - x(t)),
//!   applied to the entropy-like H trajectory
//! - **Logistic growth with decay** (continuous, whole run):
//!   dS/dt = k·S·(1 - S/C) - ε·S, applied to the density-like S trajectory
//!
//! Both implement [`DynamicalSystem`] so the fitters can roll candidate
//! parameters forward the same way the synthetic run generator does.

mod traits;
mod logistic_map;
mod logistic_growth;
mod synthetic;

pub use traits::DynamicalSystem;
pub use logistic_map::LogisticMap;
pub use logistic_growth::{LogisticGrowth, GrowthParams};
pub use synthetic::{CycleSpec, SyntheticRun, SyntheticRunBuilder};
