//! # Complex Balls
//!
//! A `ComplexBall` is a pair of [`RealBall`]s for the real and imaginary
//! parts. The enclosure is the rectangle `re × im`, not a disk.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::mag::Mag;
use crate::real::RealBall;
use crate::scalar::{exp_series, Ball};

/// A complex number enclosure `(re ± r_re) + (im ± r_im)i`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexBall {
    re: RealBall,
    im: RealBall,
}

impl ComplexBall {
    /// Ball from real and imaginary parts.
    pub fn new(re: RealBall, im: RealBall) -> Self {
        Self { re, im }
    }

    /// Purely real ball.
    pub fn from_real(re: RealBall) -> Self {
        Self {
            re,
            im: RealBall::zero(),
        }
    }

    /// Exact zero.
    pub fn zero() -> Self {
        Self::from_real(RealBall::zero())
    }

    /// Exact one.
    pub fn one() -> Self {
        Self::from_real(RealBall::one())
    }

    /// Exact imaginary unit.
    pub fn i() -> Self {
        Self::new(RealBall::zero(), RealBall::one())
    }

    /// Exact point `re + im·i` from doubles.
    pub fn from_f64(re: f64, im: f64) -> Self {
        Self::new(RealBall::from_f64(re), RealBall::from_f64(im))
    }

    /// `(0 ± ∞) + (0 ± ∞)i`.
    pub fn indeterminate() -> Self {
        Self::new(RealBall::indeterminate(), RealBall::indeterminate())
    }

    /// Real part.
    pub fn re(&self) -> &RealBall {
        &self.re
    }

    /// Imaginary part.
    pub fn im(&self) -> &RealBall {
        &self.im
    }

    /// `true` when both parts are exactly zero.
    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    /// `true` when the imaginary part is exactly zero.
    pub fn is_real(&self) -> bool {
        self.im.is_zero()
    }

    /// `true` when both radii are zero.
    pub fn is_exact(&self) -> bool {
        self.re.is_exact() && self.im.is_exact()
    }

    /// `true` when both radii are finite.
    pub fn is_finite(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Sum at `prec` bits.
    pub fn add(&self, other: &Self, prec: u64) -> Self {
        Self::new(self.re.add(&other.re, prec), self.im.add(&other.im, prec))
    }

    /// Difference at `prec` bits.
    pub fn sub(&self, other: &Self, prec: u64) -> Self {
        Self::new(self.re.sub(&other.re, prec), self.im.sub(&other.im, prec))
    }

    /// Negation (exact).
    pub fn neg(&self) -> Self {
        Self::new(self.re.neg(), self.im.neg())
    }

    /// Product at `prec` bits.
    pub fn mul(&self, other: &Self, prec: u64) -> Self {
        if self.is_real() && other.is_real() {
            return Self::from_real(self.re.mul(&other.re, prec));
        }
        let ac = self.re.mul(&other.re, prec);
        let bd = self.im.mul(&other.im, prec);
        let ad = self.re.mul(&other.im, prec);
        let bc = self.im.mul(&other.re, prec);
        Self::new(ac.sub(&bd, prec), ad.add(&bc, prec))
    }

    /// Square at `prec` bits.
    pub fn sqr(&self, prec: u64) -> Self {
        if self.is_real() {
            return Self::from_real(self.re.sqr(prec));
        }
        let a2 = self.re.sqr(prec);
        let b2 = self.im.sqr(prec);
        let ab = self.re.mul(&self.im, prec).mul_2exp(1);
        Self::new(a2.sub(&b2, prec), ab)
    }

    /// Exact scaling by `2^e`.
    pub fn mul_2exp(&self, e: i64) -> Self {
        Self::new(self.re.mul_2exp(e), self.im.mul_2exp(e))
    }

    /// Product with an integer at `prec` bits.
    pub fn mul_bigint(&self, c: &BigInt, prec: u64) -> Self {
        Self::new(self.re.mul_bigint(c, prec), self.im.mul_bigint(c, prec))
    }

    /// `self += x · c` at `prec` bits.
    pub fn addmul_bigint(&mut self, x: &Self, c: &BigInt, prec: u64) {
        self.re.addmul_bigint(&x.re, c, prec);
        self.im.addmul_bigint(&x.im, c, prec);
    }

    /// Quotient by a nonzero integer at `prec` bits.
    pub fn div_bigint(&self, c: &BigInt, prec: u64) -> Self {
        Self::new(self.re.div_bigint(c, prec), self.im.div_bigint(c, prec))
    }

    /// Widen both radii by `err`.
    pub fn add_error(&mut self, err: &Mag) {
        self.re.add_error(err);
        self.im.add_error(err);
    }

    /// Round both midpoints to `prec` bits.
    pub fn round(&self, prec: u64) -> Self {
        Self::new(self.re.round(prec), self.im.round(prec))
    }

    /// Upper bound for `|z|`, as `|re| + |im|`.
    pub fn abs_upper(&self) -> Mag {
        self.re.abs_upper().add(&self.im.abs_upper())
    }

    /// `true` when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.re.contains(&other.re) && self.im.contains(&other.im)
    }

    /// `true` when the exact point `re + im·i` lies in the ball.
    pub fn contains_rationals(&self, re: &BigRational, im: &BigRational) -> bool {
        self.re.contains_rational(re) && self.im.contains_rational(im)
    }

    /// `true` when the two rectangles intersect.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.re.overlaps(&other.re) && self.im.overlaps(&other.im)
    }

    /// Exponential at `prec` bits.
    pub fn exp(&self, prec: u64) -> Self {
        exp_series(self, prec)
    }
}

impl From<RealBall> for ComplexBall {
    fn from(re: RealBall) -> Self {
        Self::from_real(re)
    }
}

impl Ball for ComplexBall {
    fn zero() -> Self {
        ComplexBall::zero()
    }

    fn one() -> Self {
        ComplexBall::one()
    }

    fn indeterminate() -> Self {
        ComplexBall::indeterminate()
    }

    fn is_zero(&self) -> bool {
        ComplexBall::is_zero(self)
    }

    fn is_finite(&self) -> bool {
        ComplexBall::is_finite(self)
    }

    fn add(&self, other: &Self, prec: u64) -> Self {
        ComplexBall::add(self, other, prec)
    }

    fn sub(&self, other: &Self, prec: u64) -> Self {
        ComplexBall::sub(self, other, prec)
    }

    fn mul(&self, other: &Self, prec: u64) -> Self {
        ComplexBall::mul(self, other, prec)
    }

    fn sqr(&self, prec: u64) -> Self {
        ComplexBall::sqr(self, prec)
    }

    fn mul_2exp(&self, e: i64) -> Self {
        ComplexBall::mul_2exp(self, e)
    }

    fn mul_bigint(&self, c: &BigInt, prec: u64) -> Self {
        ComplexBall::mul_bigint(self, c, prec)
    }

    fn addmul_bigint(&mut self, x: &Self, c: &BigInt, prec: u64) {
        ComplexBall::addmul_bigint(self, x, c, prec)
    }

    fn div_bigint(&self, c: &BigInt, prec: u64) -> Self {
        ComplexBall::div_bigint(self, c, prec)
    }

    fn add_error(&mut self, err: &Mag) {
        ComplexBall::add_error(self, err)
    }

    fn round(&self, prec: u64) -> Self {
        ComplexBall::round(self, prec)
    }

    fn mag_upper(&self) -> Mag {
        self.abs_upper()
    }

    fn contains(&self, other: &Self) -> bool {
        ComplexBall::contains(self, other)
    }

    fn overlaps(&self, other: &Self) -> bool {
        ComplexBall::overlaps(self, other)
    }
}

impl fmt::Display for ComplexBall {
    /// `(re + imj)  +/-  (r_re, r_imj)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(15);
        let im = self.im.mid();
        let (op, im_abs) = if im.is_negative() {
            ("-", im.neg())
        } else {
            ("+", im.clone())
        };
        write!(
            f,
            "({:.*} {} {:.*}j)  +/-  ({}, {}j)",
            digits,
            self.re.mid(),
            op,
            digits,
            im_abs,
            self.re.rad(),
            self.im.rad()
        )
    }
}
