//! # HS-Cycle-Dynamics
//!
//! Regime Analysis of Recorded Agent Metrics: Cycle Segmentation, Symbolic
//! Events and Logistic Dynamics
//!
//! ## Framework
//!
//! An external reinforcement-learning loop records, per step, an
//! entropy-like scalar H (diversity of the actions taken), a density-like
//! scalar S (successful outcomes normalized by a capacity constant), an
//! optional modularity Q, and a termination flag. This crate reads such a
//! sequence and describes how the agent moves between regimes.
//!
//! ### Methodology
//!
//! 1. **Segmentation**: split the run into cycles wherever H or S jumps
//!    past a threshold, or the episode terminated
//!
//! 2. **Symbolic events**: label steps with `∅ Σ Δ Ω ⊖ ≈` using a
//!    one-step-lookback state machine
//!
//! 3. **Transitions**: flag fine-grained jumps in the smoothed signals, and
//!    report jump magnitudes at every cycle boundary
//!
//! 4. **Dynamics**: fit the logistic map x(t+1) = r·x(t)·(1 - x(t)) to the
//!    H trajectory of each cycle, and the growth law
//!    dS/dt = k·S·(1 - S/C) - ε·S to the whole S trajectory
//!
//! ## Boundaries
//!
//! The library never touches the filesystem: it consumes a loaded
//! `Vec<StepRecord>` and returns structured records. Loading, plotting and
//! report rendering belong to the caller (see the `hs-analyze` binary).

pub mod config;
pub mod error;
pub mod events;
pub mod fitting;
pub mod metrics;
pub mod pipeline;
pub mod records;
pub mod segmentation;
pub mod systems;
pub mod transitions;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};

// Re-exports from records
pub use records::{
    validate_sequence,
    Cycle,
    CycleTransition,
    Event,
    EventSymbol,
    StepRecord,
    TransitionPoint,
    TransitionReason,
};

// Re-exports from segmentation
pub use segmentation::{
    ChangePoint,
    ChangePointRule,
    CycleTransitionDetector,
    Segmentation,
    Segmenter,
};

// Re-exports from events
pub use events::{
    group_by_integration,
    EventClassifier,
    EventCounts,
    EventCycle,
    QEvent,
    QEventDetector,
    QEventKind,
};

pub use transitions::TransitionDetector;

// Re-exports from fitting
pub use fitting::{
    CycleFit,
    FitFailure,
    FitOutcome,
    GrowthFitResult,
    GrowthFitter,
    LogisticFitResult,
    LogisticMapFitter,
    SkipReason,
};

// Re-exports from systems
pub use systems::{
    DynamicalSystem,
    GrowthParams,
    LogisticGrowth,
    LogisticMap,
    SyntheticRun,
    SyntheticRunBuilder,
};

pub use pipeline::{AnalysisPipeline, AnalysisReport, QEventOutcome, RunSummary};
