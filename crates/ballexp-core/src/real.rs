//! # Real Balls
//!
//! A `RealBall` is a midpoint [`Float`] and a radius [`Mag`] jointly
//! enclosing an unknown real number: the true value lies in
//! `[mid - rad, mid + rad]`.
//!
//! ## Soundness Invariant
//!
//! Every operation returns a ball containing the exact result of the
//! operation applied to *any* choice of points from the input balls.
//! Midpoints are rounded at the requested precision and the rounding
//! error is added to the radius.
//!
//! ## Range Guard
//!
//! Midpoints are kept within binary exponents `±MID_MAX_EXP`. A midpoint
//! that overflows turns the ball into `0 ± ∞`; one that underflows is
//! replaced by zero with its magnitude folded into the radius. Both
//! replacements are enclosures of the original ball, so the guard keeps
//! arithmetic total without weakening soundness.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

use crate::float::Float;
use crate::mag::Mag;
use crate::scalar::{exp_series, Ball};

/// Largest binary exponent a ball midpoint may reach.
pub const MID_MAX_EXP: i64 = 1 << 60;

/// A real number enclosure `[mid ± rad]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RealBall {
    mid: Float,
    rad: Mag,
}

impl RealBall {
    /// Ball with the given midpoint and radius.
    pub fn new(mid: Float, rad: Mag) -> Self {
        Self::guarded(mid, rad)
    }

    /// Exact zero.
    pub fn zero() -> Self {
        Self {
            mid: Float::zero(),
            rad: Mag::zero(),
        }
    }

    /// Exact one.
    pub fn one() -> Self {
        Self::exact(Float::one())
    }

    /// Exact point ball.
    pub fn exact(mid: Float) -> Self {
        Self::guarded(mid, Mag::zero())
    }

    /// Exact integer.
    pub fn from_i64(n: i64) -> Self {
        Self::exact(Float::from_i64(n))
    }

    /// Exact double; NaN and infinities give `0 ± ∞`.
    pub fn from_f64(x: f64) -> Self {
        Float::from_f64(x).map_or_else(Self::indeterminate, Self::exact)
    }

    /// Enclosure of a rational at `prec` bits.
    pub fn from_rational(q: &BigRational, prec: u64) -> Self {
        let (mid, err) = Float::from_rational_round(q, prec);
        Self::guarded(mid, err)
    }

    /// `0 ± ∞`, which contains every real number.
    pub fn indeterminate() -> Self {
        Self {
            mid: Float::zero(),
            rad: Mag::inf(),
        }
    }

    fn guarded(mid: Float, rad: Mag) -> Self {
        if mid.is_zero() {
            return Self { mid, rad };
        }
        let top = mid.top_exponent();
        if top > MID_MAX_EXP {
            return Self::indeterminate();
        }
        if top < -MID_MAX_EXP {
            let rad = rad.add(&mid.abs_upper());
            return Self {
                mid: Float::zero(),
                rad,
            };
        }
        Self { mid, rad }
    }

    /// The midpoint.
    pub fn mid(&self) -> &Float {
        &self.mid
    }

    /// The radius.
    pub fn rad(&self) -> &Mag {
        &self.rad
    }

    /// `true` when the ball is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.mid.is_zero() && self.rad.is_zero()
    }

    /// `true` when the ball is exactly one.
    pub fn is_one(&self) -> bool {
        self.rad.is_zero() && self.mid == Float::one()
    }

    /// `true` when the radius is zero.
    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// `true` when the radius is finite.
    pub fn is_finite(&self) -> bool {
        !self.rad.is_inf()
    }

    /// Sum at `prec` bits.
    pub fn add(&self, other: &Self, prec: u64) -> Self {
        let (mid, err) = self.mid.add_round(&other.mid, prec);
        Self::guarded(mid, self.rad.add(&other.rad).add(&err))
    }

    /// Difference at `prec` bits.
    pub fn sub(&self, other: &Self, prec: u64) -> Self {
        let (mid, err) = self.mid.sub_round(&other.mid, prec);
        Self::guarded(mid, self.rad.add(&other.rad).add(&err))
    }

    /// Negation (exact).
    pub fn neg(&self) -> Self {
        Self {
            mid: self.mid.neg(),
            rad: self.rad,
        }
    }

    /// Product at `prec` bits.
    ///
    /// `|xy - m_x m_y| ≤ |m_x| r_y + |m_y| r_x + r_x r_y`.
    pub fn mul(&self, other: &Self, prec: u64) -> Self {
        let (mid, err) = self.mid.mul_round(&other.mid, prec);
        let rad = self
            .mid
            .abs_upper()
            .mul(&other.rad)
            .add(&other.mid.abs_upper().mul(&self.rad))
            .add(&self.rad.mul(&other.rad))
            .add(&err);
        Self::guarded(mid, rad)
    }

    /// Square at `prec` bits.
    pub fn sqr(&self, prec: u64) -> Self {
        let (mid, err) = self.mid.mul_round(&self.mid, prec);
        let rad = self
            .mid
            .abs_upper()
            .mul_2exp(1)
            .add(&self.rad)
            .mul(&self.rad)
            .add(&err);
        Self::guarded(mid, rad)
    }

    /// Exact scaling by `2^e`.
    pub fn mul_2exp(&self, e: i64) -> Self {
        Self::guarded(self.mid.mul_2exp(e), self.rad.mul_2exp(e))
    }

    /// Product with an integer at `prec` bits.
    pub fn mul_bigint(&self, c: &BigInt, prec: u64) -> Self {
        let (mid, err) = self.mid.mul_round(&Float::from_bigint(c.clone()), prec);
        let rad = self.rad.mul(&Mag::from_bigint_abs(c)).add(&err);
        Self::guarded(mid, rad)
    }

    /// `self += x · c` at `prec` bits.
    pub fn addmul_bigint(&mut self, x: &Self, c: &BigInt, prec: u64) {
        let term = x.mul_bigint(c, prec);
        *self = self.add(&term, prec);
    }

    /// Quotient by a nonzero integer at `prec` bits.
    pub fn div_bigint(&self, c: &BigInt, prec: u64) -> Self {
        let (mid, err) = self.mid.div_bigint_round(c, prec);
        let divisor = Mag::from_biguint_lower(c.magnitude());
        let rad = self.rad.div(&divisor).add(&err);
        Self::guarded(mid, rad)
    }

    /// Widen the radius by `err`.
    pub fn add_error(&mut self, err: &Mag) {
        self.rad = self.rad.add(err);
    }

    /// Round the midpoint to `prec` bits, absorbing the error.
    pub fn round(&self, prec: u64) -> Self {
        let (mid, err) = self.mid.round(prec);
        Self::guarded(mid, self.rad.add(&err))
    }

    /// Upper bound for `|x|` over the ball.
    pub fn abs_upper(&self) -> Mag {
        self.mid.abs_upper().add(&self.rad)
    }

    /// `true` when every point of `other` lies in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        let Some(outer) = Float::from_mag(&self.rad) else {
            return true;
        };
        let Some(inner) = Float::from_mag(&other.rad) else {
            return false;
        };
        // |other.mid - self.mid| + inner <= outer, one side at a time.
        let neg_outer = outer.neg();
        let above = [other.mid.clone(), self.mid.neg(), inner.clone(), neg_outer.clone()];
        let below = [self.mid.clone(), other.mid.neg(), inner, neg_outer];
        Float::sign_of_sum(&above) != Ordering::Greater
            && Float::sign_of_sum(&below) != Ordering::Greater
    }

    /// `true` when the exact rational `q` lies in the ball.
    pub fn contains_rational(&self, q: &BigRational) -> bool {
        match self.rad.to_rational() {
            None => true,
            Some(rad) => (q - self.mid.to_rational()).abs() <= rad,
        }
    }

    /// `true` when the two balls share at least one point.
    pub fn overlaps(&self, other: &Self) -> bool {
        let (Some(ra), Some(rb)) = (Float::from_mag(&self.rad), Float::from_mag(&other.rad)) else {
            return true;
        };
        let (ra, rb) = (ra.neg(), rb.neg());
        let above = [self.mid.clone(), other.mid.neg(), ra.clone(), rb.clone()];
        let below = [other.mid.clone(), self.mid.neg(), ra, rb];
        Float::sign_of_sum(&above) != Ordering::Greater
            && Float::sign_of_sum(&below) != Ordering::Greater
    }

    /// Exponential at `prec` bits.
    pub fn exp(&self, prec: u64) -> Self {
        exp_series(self, prec)
    }
}

impl Ball for RealBall {
    fn zero() -> Self {
        RealBall::zero()
    }

    fn one() -> Self {
        RealBall::one()
    }

    fn indeterminate() -> Self {
        RealBall::indeterminate()
    }

    fn is_zero(&self) -> bool {
        RealBall::is_zero(self)
    }

    fn is_finite(&self) -> bool {
        RealBall::is_finite(self)
    }

    fn add(&self, other: &Self, prec: u64) -> Self {
        RealBall::add(self, other, prec)
    }

    fn sub(&self, other: &Self, prec: u64) -> Self {
        RealBall::sub(self, other, prec)
    }

    fn mul(&self, other: &Self, prec: u64) -> Self {
        RealBall::mul(self, other, prec)
    }

    fn sqr(&self, prec: u64) -> Self {
        RealBall::sqr(self, prec)
    }

    fn mul_2exp(&self, e: i64) -> Self {
        RealBall::mul_2exp(self, e)
    }

    fn mul_bigint(&self, c: &BigInt, prec: u64) -> Self {
        RealBall::mul_bigint(self, c, prec)
    }

    fn div_bigint(&self, c: &BigInt, prec: u64) -> Self {
        RealBall::div_bigint(self, c, prec)
    }

    fn add_error(&mut self, err: &Mag) {
        RealBall::add_error(self, err)
    }

    fn round(&self, prec: u64) -> Self {
        RealBall::round(self, prec)
    }

    fn mag_upper(&self) -> Mag {
        self.abs_upper()
    }

    fn contains(&self, other: &Self) -> bool {
        RealBall::contains(self, other)
    }

    fn overlaps(&self, other: &Self) -> bool {
        RealBall::overlaps(self, other)
    }
}

impl fmt::Display for RealBall {
    /// `mid +/- rad`; the formatter precision sets the midpoint digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(15);
        write!(f, "{:.*} +/- {}", digits, self.mid, self.rad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_exact_operations_stay_exact() {
        let a = RealBall::from_f64(1.5);
        let b = RealBall::from_f64(-0.25);
        assert_eq!(a.add(&b, 64), RealBall::from_f64(1.25));
        assert_eq!(a.mul(&b, 64), RealBall::from_f64(-0.375));
        assert_eq!(a.sqr(64), RealBall::from_f64(2.25));
        assert_eq!(a.mul_2exp(3), RealBall::from_f64(12.0));
        assert!(a.mul(&b, 64).is_exact());
    }

    #[test]
    fn test_rational_enclosure() {
        let third = RealBall::from_rational(&q(1, 3), 64);
        assert!(!third.is_exact());
        assert!(third.contains_rational(&q(1, 3)));
        assert!(!third.contains_rational(&(q(1, 3) + q(1, 1 << 40))));
    }

    #[test]
    fn test_mul_radius_propagation() {
        let a = RealBall::new(Float::from_i64(2), Mag::pow2(-10));
        let b = RealBall::new(Float::from_i64(-3), Mag::pow2(-12));
        let p = a.mul(&b, 64);
        // Corners of the product box.
        for x in [q(2, 1) - q(1, 1024), q(2, 1) + q(1, 1024)] {
            for y in [q(-3, 1) - q(1, 4096), q(-3, 1) + q(1, 4096)] {
                assert!(p.contains_rational(&(&x * &y)));
            }
        }
    }

    #[test]
    fn test_div_bigint() {
        let x = RealBall::new(Float::one(), Mag::pow2(-20));
        let d = x.div_bigint(&BigInt::from(7), 80);
        assert!(d.contains_rational(&(q(1, 7) + q(1, 7 << 20))));
        assert!(d.contains_rational(&(q(1, 7) - q(1, 7 << 20))));
    }

    #[test]
    fn test_addmul_bigint() {
        let mut acc = RealBall::from_i64(1);
        acc.addmul_bigint(&RealBall::from_f64(0.5), &BigInt::from(6), 64);
        assert_eq!(acc, RealBall::from_i64(4));
    }

    #[test]
    fn test_contains_and_overlaps() {
        let wide = RealBall::new(Float::zero(), Mag::one());
        let narrow = RealBall::new(Float::from_f64(0.5).unwrap(), Mag::pow2(-1));
        let outside = RealBall::new(Float::from_i64(3), Mag::pow2(-1));
        assert!(wide.contains(&narrow));
        assert!(!narrow.contains(&wide));
        assert!(!wide.overlaps(&outside));
        assert!(narrow.overlaps(&wide));
        assert!(RealBall::indeterminate().contains(&outside));
        assert!(!outside.contains(&RealBall::indeterminate()));
    }

    #[test]
    fn test_contains_and_overlaps_across_distant_exponents() {
        let e = 1i64 << 40;
        let big = RealBall::exact(Float::one().mul_2exp(e));
        assert!(!big.contains(&RealBall::one()));
        assert!(!RealBall::one().contains(&big));
        assert!(!big.overlaps(&RealBall::one()));

        let wide = RealBall::new(Float::zero(), Mag::pow2(e + 1));
        assert!(wide.contains(&big));
        assert!(wide.contains(&RealBall::one()));
        assert!(wide.overlaps(&big));

        let speck = RealBall::new(Float::one(), Mag::pow2(-e));
        assert!(speck.contains(&RealBall::one()));
        assert!(!RealBall::one().contains(&speck));
        assert!(speck.overlaps(&RealBall::one()));
    }

    #[test]
    fn test_range_guard() {
        let huge = RealBall::exact(Float::one().mul_2exp(MID_MAX_EXP - 1));
        let sq = huge.sqr(64);
        assert!(!sq.is_finite());
        assert!(sq.contains(&RealBall::from_i64(12345)));

        let tiny = RealBall::exact(Float::one().mul_2exp(-MID_MAX_EXP + 1));
        let t2 = tiny.sqr(64);
        assert!(t2.mid().is_zero());
        assert!(t2.is_finite());
        assert!(!t2.rad().is_zero());
    }

    #[test]
    fn test_round_keeps_enclosure() {
        let x = RealBall::from_rational(&q(2, 3), 200);
        let r = x.round(20);
        assert!(r.contains(&x));
        assert!(r.contains_rational(&q(2, 3)));
    }

    #[test]
    fn test_display() {
        let x = RealBall::new(Float::from_f64(0.75).unwrap(), Mag::pow2(-10));
        assert_eq!(format!("{x:.3}"), "7.50e-1 +/- 9.766e-4");
        assert_eq!(RealBall::one().to_string(), "1.00000000000000e0 +/- 0");
        assert!(RealBall::from_rational(&BigRational::one(), 10).is_one());
    }
}
