//! # Tail-Error Injection
//!
//! For `‖A‖ ≤ ν`, every entry of `Σ_{k≥N} A^k / k!` is bounded in absolute
//! value by `Σ_{k≥N} ν^k / k!`. Adding that bound to every entry of the
//! truncated sum turns it into an enclosure of the full series.

use ballexp_core::{Ball, Mag};

use crate::matrix::BallMatrix;

/// Bound on the discarded tail `Σ_{k≥terms} norm^k / k!`.
pub fn tail_bound(norm: &Mag, terms: u64) -> Mag {
    norm.exp_tail(terms)
}

/// Widen every entry of `b` by `err`. Complex entries are widened in both
/// the real and the imaginary part.
pub fn inject_tail<T: Ball>(b: &mut BallMatrix<T>, err: &Mag) {
    if !err.is_zero() {
        b.add_error(err);
    }
}
