//! # Float — Exact Binary Floating-Point Values
//!
//! `Float` is `man · 2^exp` with an arbitrary-precision integer mantissa.
//! Addition, subtraction and multiplication are exact; precision is only
//! lost through the explicit rounding operations, each of which returns a
//! [`Mag`] bound on the error it introduced. Ball midpoints are `Float`s.
//!
//! ## Normalization
//!
//! The mantissa is odd, or zero with exponent zero. Two equal values
//! therefore have identical representations and derived `Eq` is value
//! equality.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::mag::{ldexp, pow2_rational, Mag};

/// An exact dyadic number `man · 2^exp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Float {
    man: BigInt,
    exp: i64,
}

impl Float {
    /// Exact zero.
    pub fn zero() -> Self {
        Self {
            man: BigInt::zero(),
            exp: 0,
        }
    }

    /// Exact one.
    pub fn one() -> Self {
        Self {
            man: BigInt::one(),
            exp: 0,
        }
    }

    /// `man · 2^exp`, normalized.
    pub fn from_parts(man: BigInt, exp: i64) -> Self {
        match man.trailing_zeros() {
            None => Self::zero(),
            Some(0) => Self { man, exp },
            Some(tz) => Self {
                man: man >> tz,
                exp: exp + tz as i64,
            },
        }
    }

    /// Exact integer value.
    pub fn from_bigint(n: BigInt) -> Self {
        Self::from_parts(n, 0)
    }

    /// Exact integer value.
    pub fn from_i64(n: i64) -> Self {
        Self::from_bigint(BigInt::from(n))
    }

    /// Exact conversion from a finite double; `None` for NaN or ±∞.
    pub fn from_f64(x: f64) -> Option<Self> {
        if !x.is_finite() {
            return None;
        }
        let bits = x.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let frac = bits & ((1u64 << 52) - 1);
        let (m, e) = if biased == 0 {
            (frac, -1074)
        } else {
            (frac | (1u64 << 52), biased - 1075)
        };
        let m = BigInt::from(m);
        Some(Self::from_parts(if negative { -m } else { m }, e))
    }

    /// Exact value of a finite magnitude; `None` for +∞.
    pub fn from_mag(m: &Mag) -> Option<Self> {
        let (man, exp) = m.raw_parts()?;
        Some(Self::from_parts(BigInt::from(man), exp))
    }

    /// The (odd) mantissa.
    pub fn mantissa(&self) -> &BigInt {
        &self.man
    }

    /// The binary exponent of the last mantissa bit.
    pub fn exponent(&self) -> i64 {
        self.exp
    }

    /// `t` with `2^(t-1) ≤ |self| < 2^t`; `i64::MIN` for zero.
    pub fn top_exponent(&self) -> i64 {
        if self.is_zero() {
            i64::MIN
        } else {
            self.exp + self.man.bits() as i64
        }
    }

    /// Number of significant bits.
    pub fn bits(&self) -> u64 {
        self.man.bits()
    }

    /// `true` for exact zero.
    pub fn is_zero(&self) -> bool {
        self.man.is_zero()
    }

    /// `true` for values below zero.
    pub fn is_negative(&self) -> bool {
        self.man.is_negative()
    }

    /// Negation.
    pub fn neg(&self) -> Self {
        Self {
            man: -&self.man,
            exp: self.exp,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            man: self.man.abs(),
            exp: self.exp,
        }
    }

    /// Exact `self · 2^e`.
    pub fn mul_2exp(&self, e: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            man: self.man.clone(),
            exp: self.exp + e,
        }
    }

    /// Exact sum.
    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let e = self.exp.min(other.exp);
        let a = &self.man << (self.exp - e) as usize;
        let b = &other.man << (other.exp - e) as usize;
        Self::from_parts(a + b, e)
    }

    /// Sign of the exact sum of `terms`, as an ordering against zero.
    ///
    /// Terms are combined largest first, and only while the two largest
    /// have top exponents within 2 of each other. Once the largest term
    /// dominates the others, its sign is the answer and the remaining
    /// terms are never shifted into a common exponent. At most five terms.
    pub fn sign_of_sum(terms: &[Float]) -> Ordering {
        debug_assert!(terms.len() <= 5, "dominance margin assumes at most five terms");
        let mut live: Vec<Float> = terms.iter().filter(|t| !t.is_zero()).cloned().collect();
        loop {
            live.sort_by_key(|t| std::cmp::Reverse(t.top_exponent()));
            let Some(first) = live.first() else {
                return Ordering::Equal;
            };
            let sign = first.man.sign().cmp(&Sign::NoSign);
            let Some(second) = live.get(1) else {
                return sign;
            };
            // |first| >= 2^(t1-1) while the rest sum below 4 * 2^t2.
            if first.top_exponent() >= second.top_exponent() + 3 {
                return sign;
            }
            let merged = first.add(second);
            live.drain(..2);
            if !merged.is_zero() {
                live.push(merged);
            }
        }
    }

    /// Exact difference.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Exact product.
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        Self::from_parts(&self.man * &other.man, self.exp + other.exp)
    }

    /// Round to nearest at `prec` significant bits.
    ///
    /// Returns the rounded value and a bound on `|self - rounded|`.
    pub fn round(&self, prec: u64) -> (Self, Mag) {
        let bits = self.man.bits();
        if bits <= prec {
            return (self.clone(), Mag::zero());
        }
        let shift = bits - prec;
        let sign = self.man.sign();
        let mag = self.man.magnitude();
        let mut q: BigUint = mag >> shift;
        let rem: BigUint = mag - (&q << shift);
        if rem.is_zero() {
            return (self.clone(), Mag::zero());
        }
        let half = BigUint::one() << (shift - 1);
        if rem >= half {
            q += 1u32;
        }
        let rounded = Self::from_parts(BigInt::from_biguint(sign, q), self.exp + shift as i64);
        // Round-to-nearest error is at most half a unit in the last place.
        let err = Mag::pow2(self.exp + shift as i64 - 1);
        (rounded, err)
    }

    /// `self + other` rounded to `prec` bits, with error bound.
    ///
    /// When the smaller operand lies entirely below the rounding position
    /// of the larger one, it is not added at all but absorbed into the
    /// error bound. This keeps the cost independent of the exponent gap.
    pub fn add_round(&self, other: &Self, prec: u64) -> (Self, Mag) {
        if other.is_zero() {
            return self.round(prec);
        }
        if self.is_zero() {
            return other.round(prec);
        }
        let (big, small) = if self.top_exponent() >= other.top_exponent() {
            (self, other)
        } else {
            (other, self)
        };
        let gap_limit = big.top_exponent().saturating_sub(prec as i64).saturating_sub(2);
        if small.top_exponent() < gap_limit {
            let (rounded, err) = big.round(prec);
            return (rounded, err.add(&small.abs_upper()));
        }
        self.add(other).round(prec)
    }

    /// `self - other` rounded to `prec` bits, with error bound.
    pub fn sub_round(&self, other: &Self, prec: u64) -> (Self, Mag) {
        self.add_round(&other.neg(), prec)
    }

    /// `self · other` rounded to `prec` bits, with error bound.
    pub fn mul_round(&self, other: &Self, prec: u64) -> (Self, Mag) {
        self.mul(other).round(prec)
    }

    /// `self / d` rounded to `prec` bits, with error bound. `d` must be
    /// nonzero.
    pub fn div_bigint_round(&self, d: &BigInt, prec: u64) -> (Self, Mag) {
        debug_assert!(!d.is_zero(), "division by zero");
        if self.is_zero() || d.is_zero() {
            return (Self::zero(), Mag::zero());
        }
        let shift = (prec as i64 + d.bits() as i64 - self.man.bits() as i64 + 2).max(0);
        let num: BigUint = self.man.magnitude() << shift as usize;
        let (q, r) = num.div_rem(d.magnitude());
        let sign = if self.man.sign() == d.sign() {
            Sign::Plus
        } else {
            Sign::Minus
        };
        let exp = self.exp - shift;
        // Truncation leaves |true - q·2^exp| < 2^exp.
        let trunc_err = if r.is_zero() {
            Mag::zero()
        } else {
            Mag::pow2(exp)
        };
        let (rounded, round_err) = Self::from_parts(BigInt::from_biguint(sign, q), exp).round(prec);
        (rounded, trunc_err.add(&round_err))
    }

    /// A rational rounded to `prec` bits, with error bound.
    pub fn from_rational_round(q: &BigRational, prec: u64) -> (Self, Mag) {
        let numer = Self::from_bigint(q.numer().clone());
        if q.denom().is_one() {
            numer.round(prec)
        } else {
            numer.div_bigint_round(q.denom(), prec)
        }
    }

    /// Upper bound for `|self|`.
    pub fn abs_upper(&self) -> Mag {
        Mag::from_biguint(self.man.magnitude()).mul_2exp(self.exp)
    }

    /// Lower bound for `|self|`.
    pub fn abs_lower(&self) -> Mag {
        Mag::from_biguint_lower(self.man.magnitude()).mul_2exp(self.exp)
    }

    /// Approximate conversion to `f64`.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let bits = self.man.bits();
        let shift = bits.saturating_sub(64);
        let top = (self.man.magnitude() >> shift).to_u64().unwrap_or(u64::MAX) as f64;
        let v = ldexp(top, self.exp.saturating_add(shift as i64));
        if self.is_negative() {
            -v
        } else {
            v
        }
    }

    /// Exact rational value.
    pub fn to_rational(&self) -> BigRational {
        pow2_rational(self.man.clone(), self.exp)
    }
}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.man.sign(), other.man.sign()) {
            (a, b) if a != b => a.cmp(&b),
            _ => Float::sign_of_sum(&[self.clone(), other.neg()]),
        }
    }
}

impl Default for Float {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Float {
    /// Scientific notation with `precision` significant digits (default 15).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(15).max(1);
        f.write_str(&format_decimal(self, digits))
    }
}

/// Decimal rendering `d.ddd…e<exp>` rounded to `digits` significant digits.
///
/// Values whose binary exponent is too large for a practical decimal
/// expansion are rendered as `<approx mantissa>*2^<exp>`.
pub fn format_decimal(x: &Float, digits: usize) -> String {
    if x.is_zero() {
        return "0".to_string();
    }
    let top = x.top_exponent();
    let sign = if x.is_negative() { "-" } else { "" };
    if top.unsigned_abs() > 1_000_000 {
        let shift = x.bits().saturating_sub(53);
        let lead = (x.man.magnitude() >> shift).to_f64().unwrap_or(f64::MAX);
        return format!("{sign}{lead}*2^{}", x.exp + shift as i64);
    }
    let ten = BigUint::from(10u32);
    let lower = num_traits::pow(ten.clone(), digits - 1);
    let upper = &lower * &ten;
    let mut e10 = ((top - 1) as f64 * std::f64::consts::LOG10_2).floor() as i64;
    let mut scaled = BigUint::zero();
    for _ in 0..4 {
        let k = digits as i64 - 1 - e10;
        let mut num = x.man.magnitude().clone();
        let mut den = BigUint::one();
        if x.exp >= 0 {
            num <<= x.exp as usize;
        } else {
            den <<= x.exp.unsigned_abs() as usize;
        }
        if k >= 0 {
            num *= num_traits::pow(ten.clone(), k as usize);
        } else {
            den *= num_traits::pow(ten.clone(), k.unsigned_abs() as usize);
        }
        scaled = (num * 2u32 + &den) / (den * 2u32);
        if scaled >= upper {
            e10 += 1;
        } else if scaled < lower {
            e10 -= 1;
        } else {
            break;
        }
    }
    let text = scaled.to_string();
    let (head, tail) = text.split_at(1);
    if tail.is_empty() {
        format!("{sign}{head}e{e10}")
    } else {
        format!("{sign}{head}.{tail}e{e10}")
    }
}
