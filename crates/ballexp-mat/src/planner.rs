//! # Norm & Scaling Planner
//!
//! Chooses the exponent `r` for `exp(A) = exp(A / 2^r)^(2^r)`. The target
//! magnitude for the scaled norm is `2^-q` with `q = ⌊wp^(1/4)⌋`, which
//! balances the number of Taylor terms against the number of squarings.

use std::cmp::Ordering;

use ballexp_core::Mag;

/// `⌊wp^(1/4)⌋`, the negated target exponent of the scaled norm.
pub fn target_exponent(wp: u64) -> i64 {
    let mut q = (wp as f64).powf(0.25) as i64;
    // Correct for floating-point error around perfect fourth powers.
    while (q + 1).pow(4) as u64 <= wp {
        q += 1;
    }
    while q > 0 && q.pow(4) as u64 > wp {
        q -= 1;
    }
    q
}

/// Scaling exponent `r ≥ 0` for a matrix with norm bound `norm`.
///
/// - above `2^(2·wp)` the norm is too large for order selection and
///   `r = 2·wp` is forced;
/// - below `2^-q` no scaling is needed;
/// - otherwise the norm is brought down to about `2^-q`.
pub fn scaling_exponent(norm: &Mag, wp: u64) -> u64 {
    let q = target_exponent(wp);
    let limit = 2 * wp as i64;
    if norm.cmp_2exp(limit) == Ordering::Greater {
        return 2 * wp;
    }
    if norm.cmp_2exp(-q) == Ordering::Less {
        return 0;
    }
    (q + norm.exponent()).max(0) as u64
}
