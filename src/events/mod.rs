//! Events Module: Symbolic Regime Labels
//!
//! Each step is mapped to one glyph of a six-symbol alphabet describing the
//! local dynamical regime of the agent:
//!
//! | glyph | regime               | trigger                                  |
//! |-------|----------------------|------------------------------------------|
//! | `∅`   | void / unexplored    | H < 0.5 and S < 0.2                      |
//! | `Σ`   | stable               | 0.5 ≤ H < θ_H                            |
//! | `Δ`   | volatile             | H ≥ θ_H                                  |
//! | `Ω`   | integrated           | terminated and S ≥ θ_S                   |
//! | `⊖`   | regression           | S(t) < S(t-1)                            |
//! | `≈`   | tentative recovery   | H(t) > H(t-1) right after a `⊖`          |
//!
//! Rows lower in the table override rows above them. The classifier only
//! looks one step back, so `≈` can only ever directly follow `⊖`.
//!
//! The modularity channel Q has its own coarser detector ([`QEventDetector`]).

mod classifier;
mod q_events;

pub use classifier::{group_by_integration, EventClassifier, EventCounts, EventCycle};
pub use q_events::{QEvent, QEventDetector, QEventKind};
