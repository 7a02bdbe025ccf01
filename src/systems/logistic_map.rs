//! Logistic Map: Discrete Population Recurrence
//!
//!   x(t+1) = r·x(t)·(1 - x(t))
//!
//! For x ∈ [0, 1] and r ∈ [0, 4] the orbit stays in [0, 1]:
//!
//! - r < 3: converges to the fixed point x* = 1 - 1/r
//! - 3 < r < 1 + √6: period-2 oscillation
//! - r ≳ 3.5699: onset of chaos (with periodic windows)
//!
//! Recorded H values may leave [0, 1] (H is an entropy in bits); the map is
//! iterated as-is and can then diverge, which the fitter treats as a
//! non-finite loss.
//!
//! ## References
//!
//! - May, R. M. (1976). Simple mathematical models with very complicated
//!   dynamics. Nature 261, 459–467.

use super::traits::DynamicalSystem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticMap {
    /// Growth rate
    r: f64,
    /// Current state
    x: f64,
}

impl LogisticMap {
    pub fn new(r: f64, x0: f64) -> Self {
        Self { r, x: x0 }
    }

    pub fn rate(&self) -> f64 {
        self.r
    }

    pub fn set_rate(&mut self, r: f64) {
        self.r = r;
    }

    /// One application of the map
    #[inline]
    pub fn apply(r: f64, x: f64) -> f64 {
        r * x * (1.0 - x)
    }

    /// Stable fixed point 1 - 1/r (exists for 1 < r < 3)
    pub fn fixed_point(&self) -> Option<f64> {
        (self.r > 1.0 && self.r < 3.0).then(|| 1.0 - 1.0 / self.r)
    }
}

impl DynamicalSystem for LogisticMap {
    fn step(&mut self) {
        self.x = Self::apply(self.r, self.x);
    }

    fn state(&self) -> f64 {
        self.x
    }

    fn reset(&mut self, x0: f64) {
        self.x = x0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_fixed_point() {
        let mut map = LogisticMap::new(2.8, 0.2);
        map.run(500);
        let fp = map.fixed_point().unwrap();
        assert!((map.state() - fp).abs() < 1e-9, "x = {}, x* = {}", map.state(), fp);
    }

    #[test]
    fn test_period_two() {
        let mut map = LogisticMap::new(3.2, 0.3);
        map.run(1000);
        let a = map.state();
        map.step();
        let b = map.state();
        map.step();
        assert!((a - b).abs() > 0.1, "expected oscillation");
        assert!((map.state() - a).abs() < 1e-9, "expected period 2");
    }

    #[test]
    fn test_trajectory_starts_at_seed() {
        let traj = LogisticMap::new(3.0, 0.0).trajectory(0.5, 3);
        assert_eq!(traj, vec![0.5, 0.75, 0.5625]);
    }

    #[test]
    fn test_sse_zero_on_own_orbit() {
        let mut map = LogisticMap::new(3.7, 0.0);
        let traj = map.trajectory(0.25, 12);
        assert_eq!(map.sum_squared_error(&traj), 0.0);
    }
}
