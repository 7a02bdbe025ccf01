//! Logistic-Growth Fitter: Bounded Nonlinear Least Squares on S(t)
//!
//! Levenberg–Marquardt with Marquardt scaling,
//!
//!   (JᵀJ + λ·diag(JᵀJ))·δ = -Jᵀr,
//!
//! where r are the residuals S_model(t) - S(t) and J their forward-difference
//! Jacobian. Every trial point is projected back into the parameter box.
//! λ shrinks after an accepted step and grows after a rejected one.
//!
//! The problem is rank deficient: trajectories depend on (k, C, ε) only
//! through k - ε and k/C. The damping term keeps the normal equations
//! solvable; the reported triple is one point of the minimizing set.
//!
//! The iteration runs in units of max |S|, so C and its finite-difference
//! step live on the scale of the data. C is held at or above
//! `CAPACITY_FLOOR · max |S|`; at C = 0 the S/C term is undefined.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::outcome::{FitFailure, FitOutcome, SkipReason};
use crate::config::{Bounds, GrowthConfig};
use crate::records::StepRecord;
use crate::systems::{DynamicalSystem, GrowthParams, LogisticGrowth};

const N_PARAMS: usize = 3;
const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
/// Damping beyond which no descent step exists at working precision
const LAMBDA_MAX: f64 = 1e16;
/// Relative finite-difference step
const FD_STEP: f64 = 1e-7;
/// Smallest capacity relative to the largest observation
const CAPACITY_FLOOR: f64 = 1e-6;

/// Fitted (k, C, ε) for the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthFitResult {
    pub k: f64,
    /// Carrying capacity C
    pub capacity: f64,
    pub epsilon: f64,
    /// Model trajectory at t = 0..n-1
    pub fitted: Vec<f64>,
    pub sse: f64,
    pub rmse: f64,
    /// Levenberg–Marquardt iterations used
    pub iterations: usize,
}

impl GrowthFitResult {
    pub fn params(&self) -> GrowthParams {
        GrowthParams::new(self.k, self.capacity, self.epsilon)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GrowthFitter {
    config: GrowthConfig,
}

impl GrowthFitter {
    pub fn new(config: GrowthConfig) -> Self {
        Self { config }
    }

    /// Integrate the model from `s0` for `len` samples
    pub fn model(&self, params: GrowthParams, s0: f64, len: usize) -> Vec<f64> {
        LogisticGrowth::new(params, s0)
            .with_substeps(self.config.substeps)
            .trajectory(s0, len)
    }

    fn residuals(&self, p: [f64; N_PARAMS], observed: &[f64]) -> Option<Array1<f64>> {
        let model = self.model(GrowthParams::from_array(p), observed[0], observed.len());
        let r: Array1<f64> = model.iter().zip(observed).map(|(m, o)| m - o).collect();
        r.iter().all(|v| v.is_finite()).then_some(r)
    }

    fn jacobian(
        &self,
        p: [f64; N_PARAMS],
        r0: &Array1<f64>,
        observed: &[f64],
        bounds: &[Bounds; N_PARAMS],
    ) -> Option<Array2<f64>> {
        let mut jac = Array2::zeros((observed.len(), N_PARAMS));

        for j in 0..N_PARAMS {
            let h = FD_STEP * p[j].abs().max(1.0);
            let mut shifted = p;
            // Step backwards when a forward step would leave the box
            shifted[j] = if p[j] + h <= bounds[j].upper {
                p[j] + h
            } else {
                p[j] - h
            };
            shifted[j] = bounds[j].clamp(shifted[j]);
            let dp = shifted[j] - p[j];
            if dp == 0.0 {
                continue;
            }

            let r = self.residuals(shifted, observed)?;
            for i in 0..observed.len() {
                jac[[i, j]] = (r[i] - r0[i]) / dp;
            }
        }

        Some(jac)
    }

    /// Fit against an S trajectory sampled at t = 0, 1, 2, ...
    pub fn fit(&self, observed: &[f64]) -> FitOutcome<GrowthFitResult> {
        if observed.len() < N_PARAMS {
            return FitOutcome::Skipped(SkipReason::TooFewObservations {
                observed: observed.len(),
                parameters: N_PARAMS,
            });
        }

        let raw = observed;
        let scale = observation_scale(raw);
        let scaled: Vec<f64> = raw.iter().map(|s| s / scale).collect();
        let observed = scaled.as_slice();

        let bounds = self.scaled_bounds(scale);
        let project = |p: [f64; N_PARAMS]| -> [f64; N_PARAMS] {
            std::array::from_fn(|j| bounds[j].clamp(p[j]))
        };

        let [k0, c0, eps0] = self.config.initial_guess;
        let mut p = project([k0, c0 / scale, eps0]);
        let Some(mut r) = self.residuals(p, observed) else {
            return FitOutcome::Failed(FitFailure::NonFiniteModel);
        };
        let mut cost = r.dot(&r);
        let mut lambda = LAMBDA_INIT;
        let mut converged = false;
        let mut iterations = 0;

        'outer: while iterations < self.config.max_iterations {
            iterations += 1;

            let Some(jac) = self.jacobian(p, &r, observed, &bounds) else {
                return FitOutcome::Failed(FitFailure::NonFiniteModel);
            };
            let jtj = jac.t().dot(&jac);
            let grad = jac.t().dot(&r);
            if grad.iter().all(|&g| g == 0.0) {
                converged = true;
                break;
            }

            loop {
                let mut a = jtj.clone();
                for j in 0..N_PARAMS {
                    a[[j, j]] += lambda * jtj[[j, j]].max(1e-12);
                }
                let rhs: [f64; N_PARAMS] = std::array::from_fn(|j| -grad[j]);

                let Some(delta) = solve_3x3(&a, rhs) else {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        converged = true;
                        break 'outer;
                    }
                    continue;
                };

                let candidate = project(std::array::from_fn(|j| p[j] + delta[j]));
                let step: [f64; N_PARAMS] = std::array::from_fn(|j| candidate[j] - p[j]);
                if norm(&step) <= self.config.xtol * (norm(&p) + self.config.xtol) {
                    converged = true;
                    break 'outer;
                }

                let trial = self
                    .residuals(candidate, observed)
                    .map(|rc| {
                        let c = rc.dot(&rc);
                        (rc, c)
                    })
                    .filter(|(_, c)| c.is_finite() && *c < cost);

                match trial {
                    Some((rc, candidate_cost)) => {
                        let reduction = (cost - candidate_cost) / cost.max(f64::MIN_POSITIVE);
                        p = candidate;
                        r = rc;
                        cost = candidate_cost;
                        lambda = (lambda / 10.0).max(LAMBDA_MIN);
                        if reduction < self.config.ftol || cost == 0.0 {
                            converged = true;
                            break 'outer;
                        }
                        break;
                    }
                    None => {
                        lambda *= 10.0;
                        if lambda > LAMBDA_MAX {
                            // No descent direction left: stationary point
                            converged = true;
                            break 'outer;
                        }
                    }
                }
            }
        }

        if !converged {
            warn!(iterations, cost, "growth fit did not converge");
            return FitOutcome::Failed(FitFailure::NonConvergence { iterations });
        }

        let params = GrowthParams::new(p[0], p[1] * scale, p[2]);
        let fitted = self.model(params, raw[0], raw.len());
        let sse: f64 = fitted.iter().zip(raw).map(|(m, o)| (m - o).powi(2)).sum();
        debug!(
            k = params.k,
            capacity = params.capacity,
            epsilon = params.epsilon,
            iterations,
            sse,
            "growth fit converged"
        );

        FitOutcome::Fitted(GrowthFitResult {
            k: params.k,
            capacity: params.capacity,
            epsilon: params.epsilon,
            fitted,
            sse,
            rmse: (sse / raw.len() as f64).sqrt(),
            iterations,
        })
    }

    /// Parameter box in units of `scale`, with C kept off zero
    fn scaled_bounds(&self, scale: f64) -> [Bounds; N_PARAMS] {
        let [k, capacity, epsilon] = self.config.bounds();
        let upper = capacity.upper / scale;
        let lower = (capacity.lower / scale).max(CAPACITY_FLOOR).min(upper);
        [k, Bounds::new(lower, upper), epsilon]
    }

    /// Fit the S channel of a whole run
    pub fn fit_records(&self, records: &[StepRecord]) -> FitOutcome<GrowthFitResult> {
        let s: Vec<f64> = records.iter().map(|r| r.s).collect();
        self.fit(&s)
    }
}

/// Largest finite |S|, or 1 when every value is zero or non-finite
fn observation_scale(observed: &[f64]) -> f64 {
    let max = observed
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0_f64, |m, s| m.max(s.abs()));
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

fn norm(v: &[f64; N_PARAMS]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Gaussian elimination with partial pivoting
fn solve_3x3(a: &Array2<f64>, b: [f64; N_PARAMS]) -> Option<[f64; N_PARAMS]> {
    let mut m = [[0.0; N_PARAMS + 1]; N_PARAMS];
    for i in 0..N_PARAMS {
        for j in 0..N_PARAMS {
            m[i][j] = a[[i, j]];
        }
        m[i][N_PARAMS] = b[i];
    }

    for col in 0..N_PARAMS {
        let pivot = (col..N_PARAMS)
            .max_by(|&x, &y| m[x][col].abs().total_cmp(&m[y][col].abs()))
            .unwrap_or(col);
        let pivot_value = m[pivot][col];
        if !pivot_value.is_finite() || pivot_value.abs() <= 1e-300 {
            return None;
        }
        m.swap(col, pivot);

        for row in col + 1..N_PARAMS {
            let factor = m[row][col] / m[col][col];
            for k in col..=N_PARAMS {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut x = [0.0; N_PARAMS];
    for i in (0..N_PARAMS).rev() {
        let tail: f64 = (i + 1..N_PARAMS).map(|j| m[i][j] * x[j]).sum();
        x[i] = (m[i][N_PARAMS] - tail) / m[i][i];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_solve_3x3() {
        let a = array![[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 4.0]];
        let x = solve_3x3(&a, [3.0, 5.0, 5.0]).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_system() {
        let a = Array2::zeros((3, 3));
        assert!(solve_3x3(&a, [1.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_recovers_noiseless_trajectory() {
        let truth = GrowthParams::new(0.8, 0.6, 0.1);
        let fitter = GrowthFitter::default();
        let observed = fitter.model(truth, 0.05, 40);

        let fit = fitter.fit(&observed).into_fitted().expect("fit should converge");
        let fitted = fit.params();

        assert!(fit.rmse < 1e-5, "rmse = {}", fit.rmse);
        assert_abs_diff_eq!(fitted.net_rate(), truth.net_rate(), epsilon = 1e-3);
        assert_abs_diff_eq!(fitted.crowding(), truth.crowding(), epsilon = 1e-2);
        assert!(fit.k >= 0.0 && fit.k <= 10.0);
        assert!(fit.capacity >= 0.0 && fit.capacity <= 1.0);
        assert!(fit.epsilon >= 0.0 && fit.epsilon <= 0.5);
        assert_eq!(fit.fitted.len(), 40);
        assert_eq!(fit.fitted[0], 0.05);
    }

    #[test]
    fn test_too_few_observations_skipped() {
        let outcome = GrowthFitter::default().fit(&[0.1, 0.2]);
        assert_eq!(
            outcome,
            FitOutcome::Skipped(SkipReason::TooFewObservations { observed: 2, parameters: 3 })
        );
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let fitter = GrowthFitter::new(GrowthConfig {
            max_iterations: 1,
            ..GrowthConfig::default()
        });
        let observed = fitter.model(GrowthParams::new(0.8, 0.6, 0.1), 0.05, 40);
        assert_eq!(
            fitter.fit(&observed),
            FitOutcome::Failed(FitFailure::NonConvergence { iterations: 1 })
        );
    }

    #[test]
    fn test_non_finite_observations_fail() {
        let outcome = GrowthFitter::default().fit(&[0.1, f64::NAN, 0.2, 0.3]);
        assert_eq!(outcome, FitOutcome::Failed(FitFailure::NonFiniteModel));
    }

    #[test]
    fn test_flat_zero_trajectory() {
        // S stays at zero for any parameters; nothing to fit but nothing fails
        let outcome = GrowthFitter::default().fit(&[0.0; 10]);
        let fit = outcome.into_fitted().unwrap();
        assert_eq!(fit.sse, 0.0);
    }

    #[test]
    fn test_micro_scale_growth_stays_interior() {
        // Densities around 1e-6, as produced with a capacity constant of 1e5
        let observed: Vec<f64> = (0..40).map(|t| 1e-6 * (1.0 + 0.1 * t as f64)).collect();
        let fit = GrowthFitter::default()
            .fit(&observed)
            .into_fitted()
            .expect("fit should converge");

        assert!(fit.capacity > 1e-9, "capacity = {}", fit.capacity);
        assert!(fit.k > fit.epsilon, "k = {}, ε = {}", fit.k, fit.epsilon);
        // A flat line at S(0) has rmse ≈ 2.3e-6
        assert!(fit.rmse < 2e-7, "rmse = {}", fit.rmse);
        assert!(fit.fitted[39] > fit.fitted[0]);
    }

    #[test]
    fn test_flat_micro_scale_keeps_positive_capacity() {
        let fit = GrowthFitter::default().fit(&[3e-6; 30]).into_fitted().unwrap();
        assert!(fit.capacity > 0.0);
        assert!(fit.rmse < 1e-10, "rmse = {}", fit.rmse);
    }

    #[test]
    fn test_observation_scale() {
        assert_eq!(observation_scale(&[0.0, 0.0]), 1.0);
        assert_eq!(observation_scale(&[1e-6, f64::NAN, 3e-6]), 3e-6);
    }
}
