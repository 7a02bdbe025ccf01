//! Dynamical System Trait: Shared Stepping API
//!
//! Both reference models advance one unit of time per `step()`, expose
//! their scalar state, and can produce a trajectory seeded at an arbitrary
//! initial value. The fitters only depend on this trait.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                 DynamicalSystem Trait                  │
//! ├───────────────────────────────────────────────────────┤
//! │  + step()           - Advance by one unit of t         │
//! │  + run(n)           - Advance n units                  │
//! │  + state()          - Current scalar state             │
//! │  + reset(x0)        - Restart from x0                  │
//! │  + trajectory(x0,n) - x0 followed by n-1 iterates      │
//! └───────────────────────────────────────────────────────┘
//! ```

pub trait DynamicalSystem {
    /// Advance the system by one unit of time
    fn step(&mut self);

    /// Advance `n_steps` units
    fn run(&mut self, n_steps: usize) {
        for _ in 0..n_steps {
            self.step();
        }
    }

    /// Current state
    fn state(&self) -> f64;

    /// Restart from `x0`
    fn reset(&mut self, x0: f64);

    /// `len` samples at t = 0, 1, ..., len - 1 starting from `x0`
    fn trajectory(&mut self, x0: f64, len: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(len);
        if len == 0 {
            return out;
        }

        self.reset(x0);
        out.push(self.state());
        for _ in 1..len {
            self.step();
            out.push(self.state());
        }
        out
    }

    /// Sum of squared differences between the trajectory from `observed[0]`
    /// and `observed[1..]`.
    fn sum_squared_error(&mut self, observed: &[f64]) -> f64 {
        let Some(&x0) = observed.first() else {
            return 0.0;
        };

        self.reset(x0);
        observed[1..]
            .iter()
            .map(|&y| {
                self.step();
                (self.state() - y).powi(2)
            })
            .sum()
    }
}
