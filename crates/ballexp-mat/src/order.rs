//! # Truncation-Order Selection
//!
//! Picks the number of Taylor terms `N` so that `‖A‖^N / N!` drops below
//! `2^-wp`. The choice only affects cost: the tail actually discarded is
//! bounded separately and injected into the result, so an `N` that is too
//! small widens the output but never makes it wrong.

use std::cmp::Ordering;

use ballexp_core::Mag;

/// `ln 2 / e`.
const LOG2_OVER_E: f64 = 0.254_994_597_433_953_5;

/// Number of Taylor terms for a scaled norm bound `norm` at working
/// precision `wp`. Always at least 1 and at most `max(1, 2·wp)`.
pub fn choose_terms(norm: &Mag, wp: u64) -> u64 {
    if norm.is_special()
        || norm.cmp_2exp(30) == Ordering::Greater
        || norm.cmp_2exp(-(wp as i64)) == Ordering::Less
    {
        return 1;
    }
    if norm.cmp_2exp(-300) == Ordering::Less {
        // Geometric regime: each term gains at least -exponent bits.
        let gain = norm.exponent().unsigned_abs();
        return wp.div_ceil(gain);
    }
    // Stirling: N! ≈ (N/e)^N, so N ln(N/(e·c)) ≈ wp ln 2, solved by
    // N = c·e^(W(wp ln2 / (e c)) + 1).
    let c = norm.to_f64();
    let t = lambert_w0(wp as f64 * LOG2_OVER_E / c);
    let n = c * (t + 1.0).exp();
    ((n + 1.0) as u64).min(2 * wp).max(1)
}

/// Principal branch of the Lambert W function for `x ≥ 0`.
///
/// Winitzki's approximation as a starting point, refined with Halley's
/// iteration.
pub fn lambert_w0(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        return x;
    }
    if x.is_infinite() {
        return f64::INFINITY;
    }
    let l = x.ln_1p();
    let mut w = l * (1.0 - l.ln_1p() / (2.0 + l));
    for _ in 0..32 {
        let ew = w.exp();
        let f = w * ew - x;
        let wp1 = w + 1.0;
        let step = f / (ew * wp1 - (w + 2.0) * f / (2.0 * wp1));
        w -= step;
        if step.abs() <= 4.0 * f64::EPSILON * w.abs() {
            break;
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambert_w0_inverts_w_exp_w() {
        for x in [1e-8, 0.5, 1.0, std::f64::consts::E, 10.0, 1e6, 1e40, 1e120] {
            let w = lambert_w0(x);
            let back = w * w.exp();
            assert!((back - x).abs() <= 1e-12 * x, "x = {x}, w = {w}");
        }
        assert_eq!(lambert_w0(0.0), 0.0);
        assert!((lambert_w0(std::f64::consts::E) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_degenerate_norms_use_one_term() {
        assert_eq!(choose_terms(&Mag::zero(), 100), 1);
        assert_eq!(choose_terms(&Mag::inf(), 100), 1);
        assert_eq!(choose_terms(&Mag::pow2(31), 100), 1);
        assert_eq!(choose_terms(&Mag::pow2(-101), 100), 1);
    }

    #[test]
    fn test_geometric_regime() {
        // 2^-400 has exponent -399: ceil(1000 / 399) = 3 terms.
        assert_eq!(choose_terms(&Mag::pow2(-400), 1000), 3);
    }

    #[test]
    fn test_selected_order_makes_tail_negligible() {
        for (norm, wp) in [
            (Mag::pow2(-4), 85),
            (Mag::pow2(-3), 200),
            (Mag::from_f64_upper(0.75), 128),
            (Mag::from_u64(20), 64),
        ] {
            let n = choose_terms(&norm, wp);
            assert!(n >= 1 && n <= 2 * wp);
            let tail = norm.exp_tail(n);
            // The Stirling estimate is accurate to a few bits.
            assert_eq!(
                tail.cmp_2exp(-(wp as i64) + 8),
                Ordering::Less,
                "norm = {norm}, wp = {wp}, n = {n}, tail = {tail}"
            );
        }
    }

    #[test]
    fn test_order_is_capped() {
        assert!(choose_terms(&Mag::pow2(29), 16) <= 32);
    }
}
