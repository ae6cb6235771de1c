//! Chebyshev polynomial functionality for ephemeris interpolation
//!
//! SPK types 2 and 3 store each coordinate over a time interval as a
//! Chebyshev expansion in normalized time `s` in [-1, 1].

use crate::jplephem::errors::{JplephemError, Result};

/// Evaluate a Chebyshev expansion using the Clenshaw recurrence.
///
/// Given coefficients `[c_0, c_1, ..., c_{n-1}]` and normalized time `s`,
/// computes `sum(c_k * T_k(s))`.
pub fn clenshaw(coeffs: &[f64], s: f64) -> f64 {
    let n = coeffs.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return coeffs[0];
    }

    let mut b_k1 = 0.0;
    let mut b_k2 = 0.0;
    let two_s = 2.0 * s;

    for k in (1..n).rev() {
        let b_k = two_s * b_k1 - b_k2 + coeffs[k];
        b_k2 = b_k1;
        b_k1 = b_k;
    }

    s * b_k1 - b_k2 + coeffs[0]
}

/// Evaluate the derivative of a Chebyshev expansion with respect to `s`.
///
/// Uses the forward recurrence
/// `T_k'(s) = 2 T_{k-1}(s) + 2 s T_{k-1}'(s) - T_{k-2}'(s)`.
pub fn clenshaw_derivative(coeffs: &[f64], s: f64) -> f64 {
    let n = coeffs.len();
    if n <= 1 {
        return 0.0;
    }

    let two_s = 2.0 * s;

    let mut t_prev2 = 1.0;
    let mut dt_prev2 = 0.0;
    let mut t_prev1 = s;
    let mut dt_prev1 = 1.0;

    let mut result = coeffs[1];

    for &c_k in &coeffs[2..n] {
        let t_k = two_s * t_prev1 - t_prev2;
        let dt_k = 2.0 * t_prev1 + two_s * dt_prev1 - dt_prev2;

        result += c_k * dt_k;

        t_prev2 = t_prev1;
        t_prev1 = t_k;
        dt_prev2 = dt_prev1;
        dt_prev1 = dt_k;
    }

    result
}

/// Time normalization for Chebyshev polynomial evaluation
///
/// Maps `time` into [-1, 1] for an interval centred on `midpoint` with
/// half-length `radius`.
pub fn normalize_time(time: f64, midpoint: f64, radius: f64) -> Result<f64> {
    if radius <= 0.0 {
        return Err(JplephemError::InvalidFormat(format!(
            "Chebyshev record radius must be positive, got {}",
            radius
        )));
    }

    // Allow a hair of slack at the record edges for rounding in the epoch
    let normalized = (time - midpoint) / radius;
    if !(-1.0 - 1e-12..=1.0 + 1e-12).contains(&normalized) {
        return Err(JplephemError::OutOfRange {
            jd: time,
            start_jd: midpoint - radius,
            end_jd: midpoint + radius,
        });
    }

    Ok(normalized.clamp(-1.0, 1.0))
}
