//! Per-run metrics as produced by the agent loop.
//!
//! These mirror how the upstream collaborator derives H and S from a raw
//! action/reward log: H is the Shannon entropy (bits) of the action
//! histogram, S the success count normalized by steps and a fixed
//! capacity constant.

use std::collections::BTreeMap;

/// Capacity constant dividing the success rate
pub const DEFAULT_CAPACITY: f64 = 1e5;

/// Shannon entropy in bits of the empirical action distribution.
pub fn action_entropy(actions: &[usize]) -> f64 {
    if actions.is_empty() {
        return 0.0;
    }

    // Action ids may be sparse
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &a in actions {
        *counts.entry(a).or_default() += 1;
    }

    let total = actions.len() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// successes / (total_steps · capacity); zero for an empty run
pub fn wisdom_density(successes: usize, total_steps: usize, capacity: f64) -> f64 {
    if total_steps == 0 || capacity <= 0.0 {
        return 0.0;
    }
    successes as f64 / (total_steps as f64 * capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uniform_actions() {
        // Four equally likely actions: 2 bits
        let actions = [0, 1, 2, 3, 0, 1, 2, 3];
        assert_abs_diff_eq!(action_entropy(&actions), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_action_has_zero_entropy() {
        assert_eq!(action_entropy(&[2, 2, 2]), 0.0);
        assert_eq!(action_entropy(&[]), 0.0);
    }

    #[test]
    fn test_sparse_action_ids() {
        let actions = [usize::MAX, 7, usize::MAX, 7];
        assert_abs_diff_eq!(action_entropy(&actions), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_wisdom_density() {
        assert_abs_diff_eq!(wisdom_density(50, 100, DEFAULT_CAPACITY), 5e-6, epsilon = 1e-18);
        assert_eq!(wisdom_density(5, 0, DEFAULT_CAPACITY), 0.0);
    }
}
