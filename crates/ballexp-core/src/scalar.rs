//! # Ball Scalars
//!
//! The [`Ball`] trait is the arithmetic interface matrix algorithms are
//! written against. It is implemented by [`RealBall`](crate::RealBall) and
//! [`ComplexBall`](crate::ComplexBall), so every algorithm is written once
//! and instantiated for both entry kinds.
//!
//! All operations that round take an explicit precision in bits. Every
//! operation must return an enclosure of the exact result for all points
//! of its inputs.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};

use num_bigint::BigInt;

use crate::bit_count;
use crate::mag::Mag;

/// Scalars above `2^SCALAR_EXP_MAX_LOG2` in magnitude have an exponential
/// outside the representable midpoint range, or so close to it that no
/// useful enclosure exists; their exponential is `0 ± ∞`.
pub const SCALAR_EXP_MAX_LOG2: i64 = 40;

/// Arithmetic over real or complex balls.
pub trait Ball: Clone + Debug + Display + PartialEq + Send + Sync {
    /// Exact zero.
    fn zero() -> Self;

    /// Exact one.
    fn one() -> Self;

    /// A ball containing every value.
    fn indeterminate() -> Self;

    /// `true` when the ball is exactly zero (zero midpoint and radius).
    fn is_zero(&self) -> bool;

    /// `true` when every radius is finite.
    fn is_finite(&self) -> bool;

    /// Sum at `prec` bits.
    fn add(&self, other: &Self, prec: u64) -> Self;

    /// Difference at `prec` bits.
    fn sub(&self, other: &Self, prec: u64) -> Self;

    /// Product at `prec` bits.
    fn mul(&self, other: &Self, prec: u64) -> Self;

    /// Square at `prec` bits.
    fn sqr(&self, prec: u64) -> Self {
        self.mul(self, prec)
    }

    /// Exact scaling by `2^e`.
    fn mul_2exp(&self, e: i64) -> Self;

    /// Product with an integer at `prec` bits.
    fn mul_bigint(&self, c: &BigInt, prec: u64) -> Self;

    /// `self += x · c` at `prec` bits.
    fn addmul_bigint(&mut self, x: &Self, c: &BigInt, prec: u64) {
        let term = x.mul_bigint(c, prec);
        *self = self.add(&term, prec);
    }

    /// Quotient by a nonzero integer at `prec` bits.
    fn div_bigint(&self, c: &BigInt, prec: u64) -> Self;

    /// Widen the enclosure by `err` (every component for complex balls).
    fn add_error(&mut self, err: &Mag);

    /// Round midpoints to `prec` bits.
    fn round(&self, prec: u64) -> Self;

    /// Upper bound for the absolute value over the ball.
    fn mag_upper(&self) -> Mag;

    /// `true` when `other` lies entirely inside `self`.
    fn contains(&self, other: &Self) -> bool;

    /// `true` when the two enclosures intersect.
    fn overlaps(&self, other: &Self) -> bool;

    /// Exponential at `prec` bits.
    fn exp(&self, prec: u64) -> Self {
        exp_series(self, prec)
    }
}

/// Enclosure of `e^z` at `prec` bits.
///
/// Scales `z` by `2^-r` so that `|z / 2^r| < 2^-8`, sums the Taylor
/// series by Horner's rule with just enough terms that the tail bound
/// drops below `2^-wp`, adds that bound to the radius, squares `r` times
/// and rounds to `prec`.
pub fn exp_series<T: Ball>(z: &T, prec: u64) -> T {
    if z.is_zero() {
        return T::one();
    }
    let m = z.mag_upper();
    if m.is_inf() || m.cmp_2exp(SCALAR_EXP_MAX_LOG2) == Ordering::Greater {
        return T::indeterminate();
    }
    let r = (m.exponent() + 8).max(0) as u64;
    let wp = prec + r + 2 * bit_count(prec) + 8;
    let w = z.mul_2exp(-(r as i64));
    let wm = m.mul_2exp(-(r as i64));

    let (terms, tail) = wm.exp_tail_terms(&Mag::pow2(-(wp as i64)));
    tracing::trace!(prec, wp, r, terms, "scalar exponential");

    let one = T::one();
    let mut sum = T::one();
    for k in (1..terms).rev() {
        sum = sum.mul(&w, wp).div_bigint(&BigInt::from(k), wp).add(&one, wp);
    }
    sum.add_error(&tail);
    for _ in 0..r {
        sum = sum.sqr(wp);
    }
    sum.round(prec)
}
