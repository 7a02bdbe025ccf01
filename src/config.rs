//! Tunable thresholds for every analysis stage.
//!
//! Each section carries serde defaults so a partial TOML file only needs to
//! name the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// |ΔH| above this starts a new cycle
    #[serde(default = "SegmentationConfig::default_h_threshold")]
    pub h_threshold: f64,
    /// |ΔS| above this starts a new cycle
    #[serde(default = "SegmentationConfig::default_s_threshold")]
    pub s_threshold: f64,
    #[serde(default = "SegmentationConfig::default_split_on_terminate")]
    pub split_on_terminate: bool,
}

impl SegmentationConfig {
    fn default_h_threshold() -> f64 {
        0.002
    }
    fn default_s_threshold() -> f64 {
        1e-6
    }
    fn default_split_on_terminate() -> bool {
        true
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            h_threshold: Self::default_h_threshold(),
            s_threshold: Self::default_s_threshold(),
            split_on_terminate: Self::default_split_on_terminate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// H at or above this is volatile
    #[serde(default = "EventConfig::default_h_threshold")]
    pub h_threshold: f64,
    /// S at or above this on termination is integrated
    #[serde(default = "EventConfig::default_s_threshold")]
    pub s_threshold: f64,
    /// Upper H bound of the void regime (also lower bound of the stable one)
    #[serde(default = "EventConfig::default_void_h")]
    pub void_h: f64,
    /// Upper S bound of the void regime
    #[serde(default = "EventConfig::default_void_s")]
    pub void_s: f64,
}

impl EventConfig {
    fn default_h_threshold() -> f64 {
        0.8
    }
    fn default_s_threshold() -> f64 {
        0.5
    }
    fn default_void_h() -> f64 {
        0.5
    }
    fn default_void_s() -> f64 {
        0.2
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            h_threshold: Self::default_h_threshold(),
            s_threshold: Self::default_s_threshold(),
            void_h: Self::default_void_h(),
            void_s: Self::default_void_s(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "TransitionConfig::default_window")]
    pub window: usize,
    #[serde(default = "TransitionConfig::default_entropy_jump")]
    pub entropy_jump: f64,
    #[serde(default = "TransitionConfig::default_density_jump")]
    pub density_jump: f64,
}

impl TransitionConfig {
    fn default_window() -> usize {
        3
    }
    fn default_entropy_jump() -> f64 {
        0.05
    }
    fn default_density_jump() -> f64 {
        1e-5
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            window: Self::default_window(),
            entropy_jump: Self::default_entropy_jump(),
            density_jump: Self::default_density_jump(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticMapConfig {
    #[serde(default = "LogisticMapConfig::default_r_min")]
    pub r_min: f64,
    #[serde(default = "LogisticMapConfig::default_r_max")]
    pub r_max: f64,
    /// Number of grid samples, endpoints included
    #[serde(default = "LogisticMapConfig::default_resolution")]
    pub resolution: usize,
}

impl LogisticMapConfig {
    fn default_r_min() -> f64 {
        2.5
    }
    fn default_r_max() -> f64 {
        4.0
    }
    fn default_resolution() -> usize {
        5000
    }

    /// Spacing between neighbouring grid candidates.
    pub fn grid_step(&self) -> f64 {
        if self.resolution < 2 {
            0.0
        } else {
            (self.r_max - self.r_min) / (self.resolution - 1) as f64
        }
    }
}

impl Default for LogisticMapConfig {
    fn default() -> Self {
        Self {
            r_min: Self::default_r_min(),
            r_max: Self::default_r_max(),
            resolution: Self::default_resolution(),
        }
    }
}

/// Closed interval for one ODE parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    #[serde(default = "GrowthConfig::default_k_bounds")]
    pub k_bounds: Bounds,
    #[serde(default = "GrowthConfig::default_capacity_bounds")]
    pub capacity_bounds: Bounds,
    #[serde(default = "GrowthConfig::default_epsilon_bounds")]
    pub epsilon_bounds: Bounds,
    /// Starting point (k, C, epsilon), clipped into the bounds. Defaults to
    /// the midpoint of the default box.
    #[serde(default = "GrowthConfig::default_initial_guess")]
    pub initial_guess: [f64; 3],
    /// RK4 substeps per unit of t
    #[serde(default = "GrowthConfig::default_substeps")]
    pub substeps: usize,
    #[serde(default = "GrowthConfig::default_max_iterations")]
    pub max_iterations: usize,
    /// Relative cost reduction that counts as converged
    #[serde(default = "GrowthConfig::default_ftol")]
    pub ftol: f64,
    /// Relative step size that counts as converged
    #[serde(default = "GrowthConfig::default_xtol")]
    pub xtol: f64,
}

impl GrowthConfig {
    fn default_k_bounds() -> Bounds {
        Bounds::new(0.0, 10.0)
    }
    fn default_capacity_bounds() -> Bounds {
        Bounds::new(0.0, 1.0)
    }
    fn default_epsilon_bounds() -> Bounds {
        Bounds::new(0.0, 0.5)
    }
    fn default_initial_guess() -> [f64; 3] {
        [5.0, 0.5, 0.25]
    }
    fn default_substeps() -> usize {
        20
    }
    fn default_max_iterations() -> usize {
        200
    }
    fn default_ftol() -> f64 {
        1e-12
    }
    fn default_xtol() -> f64 {
        1e-10
    }

    pub fn bounds(&self) -> [Bounds; 3] {
        [self.k_bounds, self.capacity_bounds, self.epsilon_bounds]
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            k_bounds: Self::default_k_bounds(),
            capacity_bounds: Self::default_capacity_bounds(),
            epsilon_bounds: Self::default_epsilon_bounds(),
            initial_guess: Self::default_initial_guess(),
            substeps: Self::default_substeps(),
            max_iterations: Self::default_max_iterations(),
            ftol: Self::default_ftol(),
            xtol: Self::default_xtol(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEventConfig {
    #[serde(default = "QEventConfig::default_q_threshold")]
    pub q_threshold: f64,
}

impl QEventConfig {
    fn default_q_threshold() -> f64 {
        0.05
    }
}

impl Default for QEventConfig {
    fn default() -> Self {
        Self {
            q_threshold: Self::default_q_threshold(),
        }
    }
}

/// Configuration for a full analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub transitions: TransitionConfig,
    #[serde(default)]
    pub logistic_map: LogisticMapConfig,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub q_events: QEventConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| AnalysisError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when it is missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("failed to parse config {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                warn!("failed to read config {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        let seg = &self.segmentation;
        if seg.h_threshold < 0.0 || seg.s_threshold < 0.0 {
            return invalid("segmentation thresholds must be non-negative".into());
        }

        let ev = &self.events;
        if !(ev.void_h <= ev.h_threshold) {
            return invalid(format!(
                "events.void_h ({}) must not exceed events.h_threshold ({})",
                ev.void_h, ev.h_threshold
            ));
        }

        let tr = &self.transitions;
        if tr.window == 0 {
            return invalid("transitions.window must be at least 1".into());
        }
        if tr.entropy_jump < 0.0 || tr.density_jump < 0.0 {
            return invalid("transition jump thresholds must be non-negative".into());
        }

        let lm = &self.logistic_map;
        if lm.resolution < 2 {
            return invalid("logistic_map.resolution must be at least 2".into());
        }
        if !(lm.r_min < lm.r_max) {
            return invalid(format!(
                "logistic_map.r_min ({}) must be below r_max ({})",
                lm.r_min, lm.r_max
            ));
        }

        let gr = &self.growth;
        for (name, b) in ["k", "capacity", "epsilon"].iter().zip(gr.bounds()) {
            if !(b.lower <= b.upper) {
                return invalid(format!("growth.{name}_bounds lower exceeds upper"));
            }
        }
        if gr.substeps == 0 || gr.max_iterations == 0 {
            return invalid("growth.substeps and growth.max_iterations must be positive".into());
        }

        if self.q_events.q_threshold < 0.0 {
            return invalid("q_events.q_threshold must be non-negative".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.segmentation.h_threshold, 0.002);
        assert_eq!(cfg.segmentation.s_threshold, 1e-6);
        assert!(cfg.segmentation.split_on_terminate);
        assert_eq!(cfg.events.h_threshold, 0.8);
        assert_eq!(cfg.transitions.window, 3);
        assert_eq!(cfg.logistic_map.resolution, 5000);
        assert_eq!(cfg.growth.epsilon_bounds, Bounds::new(0.0, 0.5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
            [segmentation]
            split_on_terminate = false

            [transitions]
            window = 5
            "#,
        )
        .unwrap();
        assert!(!cfg.segmentation.split_on_terminate);
        assert_eq!(cfg.segmentation.h_threshold, 0.002);
        assert_eq!(cfg.transitions.window, 5);
        assert_eq!(cfg.transitions.entropy_jump, 0.05);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = AnalysisConfig::from_toml_str("[transitions]\nwindow = 0\n").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = AnalysisConfig::load_or_default("/nonexistent/hs-cycle-dynamics.toml");
        assert_eq!(cfg, AnalysisConfig::default());
    }

    #[test]
    fn test_grid_step() {
        let lm = LogisticMapConfig { r_min: 2.0, r_max: 4.0, resolution: 5 };
        assert!((lm.grid_step() - 0.5).abs() < 1e-12);
    }
}
