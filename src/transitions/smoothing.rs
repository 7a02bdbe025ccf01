//! Centered moving average with same-length output.

use ndarray::{Array1, ArrayView1};

/// Smooth `values` with a box window of `window` samples.
///
/// The window for index `i` spans `[i - window/2, i - window/2 + window - 1]`
/// clipped to the sequence; clipped windows average fewer samples. Edge
/// values therefore differ from a zero-padded `numpy.convolve(..., "same")`,
/// which divides by `window` everywhere.
/// A window of 0 or 1 returns the input unchanged.
pub fn moving_average(values: ArrayView1<'_, f64>, window: usize) -> Array1<f64> {
    let n = values.len();
    if window <= 1 || n == 0 {
        return values.to_owned();
    }

    // Prefix sums keep this O(n) for any window
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for &v in values.iter() {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v);
    }

    let left = window / 2;
    Array1::from_iter((0..n).map(|i| {
        let lo = i.saturating_sub(left);
        let hi = (i + window - left).min(n);
        (prefix[hi] - prefix[lo]) / (hi - lo) as f64
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_constant_is_preserved() {
        let x = Array1::from_elem(7, 0.42);
        let smooth = moving_average(x.view(), 3);
        for v in smooth.iter() {
            assert_abs_diff_eq!(*v, 0.42, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_window_three_interior_and_edges() {
        let x = array![1.0, 2.0, 6.0, 4.0];
        let smooth = moving_average(x.view(), 3);
        assert_eq!(smooth.len(), 4);
        assert_abs_diff_eq!(smooth[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(smooth[1], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(smooth[2], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(smooth[3], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_even_window_alignment() {
        // window 4 at i = 2 covers indices 0..=3
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let smooth = moving_average(x.view(), 4);
        assert_abs_diff_eq!(smooth[2], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_window_wider_than_input() {
        let x = array![2.0, 4.0];
        let smooth = moving_average(x.view(), 5);
        assert_eq!(smooth.len(), 2);
        assert_abs_diff_eq!(smooth[0], 3.0, epsilon = 1e-12);
    }
}
