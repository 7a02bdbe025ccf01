//! Logistic Growth with Linear Decay
//!
//!   dS/dt = k·S·(1 - S/C) - ε·S
//!
//! where:
//! - k: intrinsic growth rate
//! - C: carrying capacity
//! - ε: linear decay (forgetting) rate
//!
//! Rewriting as dS/dt = (k - ε)·S - (k/C)·S² shows the nontrivial
//! equilibrium
//!
//!   S* = C·(1 - ε/k)      (for k > ε)
//!
//! and that trajectories depend on (k, C, ε) only through the net rate
//! k - ε and the crowding coefficient k/C.
//!
//! Integrated with classical RK4 using a fixed number of substeps per
//! unit of time.

use serde::{Deserialize, Serialize};

use super::traits::DynamicalSystem;

/// Smallest capacity used when evaluating S/C
const MIN_CAPACITY: f64 = 1e-12;

/// Parameters (k, C, ε) of the growth model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthParams {
    pub k: f64,
    pub capacity: f64,
    pub epsilon: f64,
}

impl GrowthParams {
    pub fn new(k: f64, capacity: f64, epsilon: f64) -> Self {
        Self { k, capacity, epsilon }
    }

    pub fn from_array(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.k, self.capacity, self.epsilon]
    }

    /// k - ε
    pub fn net_rate(&self) -> f64 {
        self.k - self.epsilon
    }

    /// k / C
    pub fn crowding(&self) -> f64 {
        self.k / self.capacity.max(MIN_CAPACITY)
    }

    /// Nontrivial equilibrium C·(1 - ε/k), if it is positive
    pub fn equilibrium(&self) -> Option<f64> {
        (self.k > self.epsilon).then(|| self.capacity * (1.0 - self.epsilon / self.k))
    }

    #[inline]
    pub fn derivative(&self, s: f64) -> f64 {
        self.k * s * (1.0 - s / self.capacity.max(MIN_CAPACITY)) - self.epsilon * s
    }
}

#[derive(Debug, Clone)]
pub struct LogisticGrowth {
    params: GrowthParams,
    /// Current S
    s: f64,
    /// RK4 steps per unit of time
    substeps: usize,
    /// Elapsed time
    time: f64,
}

impl LogisticGrowth {
    pub fn new(params: GrowthParams, s0: f64) -> Self {
        Self {
            params,
            s: s0,
            substeps: 20,
            time: 0.0,
        }
    }

    pub fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps.max(1);
        self
    }

    pub fn params(&self) -> GrowthParams {
        self.params
    }

    pub fn set_params(&mut self, params: GrowthParams) {
        self.params = params;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    fn rk4_step(&mut self, dt: f64) {
        let p = &self.params;
        let s = self.s;

        let k1 = p.derivative(s);
        let k2 = p.derivative(s + k1 * dt / 2.0);
        let k3 = p.derivative(s + k2 * dt / 2.0);
        let k4 = p.derivative(s + k3 * dt);

        self.s = s + (k1 + 2.0 * k2 + 2.0 * k3 + k4) * dt / 6.0;
    }
}

impl DynamicalSystem for LogisticGrowth {
    fn step(&mut self) {
        let dt = 1.0 / self.substeps as f64;
        for _ in 0..self.substeps {
            self.rk4_step(dt);
        }
        self.time += 1.0;
    }

    fn state(&self) -> f64 {
        self.s
    }

    fn reset(&mut self, s0: f64) {
        self.s = s0;
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approaches_equilibrium() {
        let params = GrowthParams::new(0.8, 0.6, 0.2);
        let mut system = LogisticGrowth::new(params, 0.01);
        system.run(200);

        let eq = params.equilibrium().unwrap();
        assert!((eq - 0.45).abs() < 1e-12);
        assert!((system.state() - eq).abs() < 1e-6, "S = {}, S* = {}", system.state(), eq);
        assert_eq!(system.time(), 200.0);
    }

    #[test]
    fn test_decay_dominated_dies_out() {
        let mut system = LogisticGrowth::new(GrowthParams::new(0.1, 1.0, 0.4), 0.3);
        system.run(100);
        assert!(system.state() < 1e-6);
    }

    #[test]
    fn test_matches_closed_form_without_decay() {
        // S(t) = C / (1 + (C/S0 - 1) e^{-kt})
        let (k, c, s0) = (0.5, 0.8, 0.05);
        let traj = LogisticGrowth::new(GrowthParams::new(k, c, 0.0), s0).trajectory(s0, 20);
        for (t, s) in traj.iter().enumerate() {
            let exact = c / (1.0 + (c / s0 - 1.0) * (-k * t as f64).exp());
            assert!((s - exact).abs() < 1e-8, "t = {}: {} vs {}", t, s, exact);
        }
    }

    #[test]
    fn test_identifiable_combinations() {
        let a = GrowthParams::new(0.8, 0.6, 0.1);
        let b = GrowthParams::new(1.0, 0.75, 0.3);
        assert!((a.net_rate() - b.net_rate()).abs() < 1e-12);
        assert!((a.crowding() - b.crowding()).abs() < 1e-12);

        let ta = LogisticGrowth::new(a, 0.0).trajectory(0.05, 30);
        let tb = LogisticGrowth::new(b, 0.0).trajectory(0.05, 30);
        for (x, y) in ta.iter().zip(&tb) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}
