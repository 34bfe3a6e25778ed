//! # Magnitude — Directed-Rounding Error Bounds
//!
//! `Mag` is a non-negative scalar used for ball radii and every other
//! quantity that must never be understated: norm bounds, tail bounds,
//! rounding errors.
//!
//! ## Representation
//!
//! A finite magnitude is `man · 2^(exp - MAG_BITS)` with a normalized
//! 30-bit mantissa `man ∈ [2^29, 2^30)`, so its value lies in
//! `[2^(exp-1), 2^exp)` and [`Mag::exponent`] returns `exp`. Zero and
//! positive infinity are distinct states.
//!
//! ## Rounding Invariant
//!
//! Every operation rounds toward +∞ unless its name ends in `_lower`.
//! Exponent overflow saturates to +∞; underflow rounds up to the smallest
//! positive magnitude. A computed `Mag` is therefore always an upper bound
//! for the exact quantity it stands for.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::ToPrimitive;

/// Mantissa width of a finite magnitude.
pub const MAG_BITS: u32 = 30;

/// Largest exponent a finite magnitude may carry.
pub const MAG_MAX_EXP: i64 = 1 << 62;

/// Smallest exponent a finite magnitude may carry.
pub const MAG_MIN_EXP: i64 = -(1 << 62);

const MAN_HALF: u64 = 1 << (MAG_BITS - 1);
const MAN_LIMIT: u64 = 1 << MAG_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Repr {
    Zero,
    Finite { man: u64, exp: i64 },
    Inf,
}

/// A non-negative upper bound with a saturating binary exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mag(Repr);

impl Mag {
    /// Exact zero.
    pub const fn zero() -> Self {
        Self(Repr::Zero)
    }

    /// Positive infinity.
    pub const fn inf() -> Self {
        Self(Repr::Inf)
    }

    /// Exactly one.
    pub fn one() -> Self {
        Self::pow2(0)
    }

    /// Exactly `2^e` (saturating at the exponent range).
    pub fn pow2(e: i64) -> Self {
        Self::from_parts(1, e as i128, true)
    }

    /// Upper bound for `x`.
    pub fn from_u64(x: u64) -> Self {
        Self::from_parts(x as u128, 0, true)
    }

    /// Lower bound for `x`.
    pub fn from_u64_lower(x: u64) -> Self {
        Self::from_parts(x as u128, 0, false)
    }

    /// Upper bound for `|x|`. NaN and infinities give +∞.
    pub fn from_f64_upper(x: f64) -> Self {
        if !x.is_finite() {
            return Self::inf();
        }
        let bits = x.abs().to_bits();
        let biased = ((bits >> 52) & 0x7ff) as i128;
        let frac = bits & ((1u64 << 52) - 1);
        let (m, e) = if biased == 0 {
            (frac, -1074)
        } else {
            (frac | (1u64 << 52), biased - 1075)
        };
        Self::from_parts(m as u128, e, true)
    }

    /// Upper bound for a non-negative big integer.
    pub fn from_biguint(n: &BigUint) -> Self {
        Self::from_biguint_rounded(n, true)
    }

    /// Lower bound for a non-negative big integer.
    pub fn from_biguint_lower(n: &BigUint) -> Self {
        Self::from_biguint_rounded(n, false)
    }

    /// Upper bound for `|n|`.
    pub fn from_bigint_abs(n: &BigInt) -> Self {
        Self::from_biguint(n.magnitude())
    }

    /// Upper bound for `|q|`.
    pub fn from_rational_upper(q: &BigRational) -> Self {
        let num = Self::from_biguint(q.numer().magnitude());
        let den = Self::from_biguint_lower(q.denom().magnitude());
        num.div(&den)
    }

    fn from_biguint_rounded(n: &BigUint, up: bool) -> Self {
        let bits = n.bits();
        if bits == 0 {
            return Self::zero();
        }
        if bits <= 64 {
            let v = n.to_u64().unwrap_or(u64::MAX);
            return Self::from_parts(v as u128, 0, up);
        }
        let shift = bits - 64;
        let top = (n >> shift).to_u64().unwrap_or(u64::MAX) as u128;
        let inexact = n.trailing_zeros().map_or(false, |tz| tz < shift);
        let top = if up && inexact { top + 1 } else { top };
        Self::from_parts(top, shift as i128, up)
    }

    /// Build `m · 2^e`, rounding the mantissa to `MAG_BITS` bits in the
    /// requested direction and clamping the exponent to the valid range.
    fn from_parts(m: u128, e: i128, up: bool) -> Self {
        if m == 0 {
            return Self::zero();
        }
        let bits = 128 - m.leading_zeros();
        let (mut man, mut e) = if bits > MAG_BITS {
            let shift = bits - MAG_BITS;
            let mut man = (m >> shift) as u64;
            if up && m & ((1u128 << shift) - 1) != 0 {
                man += 1;
            }
            (man, e + shift as i128)
        } else {
            let shift = MAG_BITS - bits;
            ((m << shift) as u64, e - shift as i128)
        };
        if man == MAN_LIMIT {
            man = MAN_HALF;
            e += 1;
        }
        let exp = e + MAG_BITS as i128;
        if exp > MAG_MAX_EXP as i128 {
            return if up {
                Self::inf()
            } else {
                Self(Repr::Finite {
                    man: MAN_LIMIT - 1,
                    exp: MAG_MAX_EXP,
                })
            };
        }
        if exp < MAG_MIN_EXP as i128 {
            return if up {
                Self(Repr::Finite {
                    man: MAN_HALF,
                    exp: MAG_MIN_EXP,
                })
            } else {
                Self::zero()
            };
        }
        Self(Repr::Finite {
            man,
            exp: exp as i64,
        })
    }

    /// Raw `(mantissa, exponent)` with value `mantissa · 2^exponent`.
    /// Zero gives `(0, 0)`; infinity gives `None`.
    pub(crate) fn raw_parts(&self) -> Option<(u64, i64)> {
        match self.0 {
            Repr::Zero => Some((0, 0)),
            Repr::Finite { man, exp } => Some((man, exp - MAG_BITS as i64)),
            Repr::Inf => None,
        }
    }

    /// `true` for exact zero.
    pub fn is_zero(&self) -> bool {
        matches!(self.0, Repr::Zero)
    }

    /// `true` for +∞.
    pub fn is_inf(&self) -> bool {
        matches!(self.0, Repr::Inf)
    }

    /// `true` for zero or +∞.
    pub fn is_special(&self) -> bool {
        !matches!(self.0, Repr::Finite { .. })
    }

    /// The exponent `e` with `2^(e-1) ≤ self < 2^e`.
    ///
    /// Meaningful for finite nonzero values only; zero reports
    /// [`MAG_MIN_EXP`] and +∞ reports [`MAG_MAX_EXP`].
    pub fn exponent(&self) -> i64 {
        match self.0 {
            Repr::Zero => MAG_MIN_EXP,
            Repr::Finite { exp, .. } => exp,
            Repr::Inf => MAG_MAX_EXP,
        }
    }

    /// Upper bound for `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        match (self.0, other.0) {
            (Repr::Inf, _) | (_, Repr::Inf) => Self::inf(),
            (Repr::Zero, _) => *other,
            (_, Repr::Zero) => *self,
            (Repr::Finite { man: ma, exp: ea }, Repr::Finite { man: mb, exp: eb }) => {
                let ((hm, he), (lm, le)) = if ea >= eb {
                    ((ma, ea), (mb, eb))
                } else {
                    ((mb, eb), (ma, ea))
                };
                let d = he as i128 - le as i128;
                if d >= 64 {
                    // The smaller term is below 2^(he-64); a single unit at
                    // 2^(he-32) dominates it.
                    Self::from_parts(((hm as u128) << 2) | 1, he as i128 - 32, true)
                } else {
                    let m = ((hm as u128) << d) + lm as u128;
                    Self::from_parts(m, le as i128 - MAG_BITS as i128, true)
                }
            }
        }
    }

    /// Upper bound for `self + 2^e`.
    pub fn add_2exp(&self, e: i64) -> Self {
        self.add(&Self::pow2(e))
    }

    /// Upper bound for `self · other`. Zero times anything is zero.
    pub fn mul(&self, other: &Self) -> Self {
        self.mul_rounded(other, true)
    }

    /// Lower bound for `self · other`.
    pub fn mul_lower(&self, other: &Self) -> Self {
        self.mul_rounded(other, false)
    }

    fn mul_rounded(&self, other: &Self, up: bool) -> Self {
        match (self.0, other.0) {
            (Repr::Zero, _) | (_, Repr::Zero) => Self::zero(),
            (Repr::Inf, _) | (_, Repr::Inf) => Self::inf(),
            (Repr::Finite { man: ma, exp: ea }, Repr::Finite { man: mb, exp: eb }) => {
                let m = ma as u128 * mb as u128;
                let e = ea as i128 + eb as i128 - 2 * MAG_BITS as i128;
                Self::from_parts(m, e, up)
            }
        }
    }

    /// Exactly `self · 2^e` (saturating).
    pub fn mul_2exp(&self, e: i64) -> Self {
        match self.0 {
            Repr::Finite { man, exp } => {
                Self::from_parts(man as u128, exp as i128 - MAG_BITS as i128 + e as i128, true)
            }
            _ => *self,
        }
    }

    /// Upper bound for `self / other`.
    pub fn div(&self, other: &Self) -> Self {
        match (self.0, other.0) {
            (Repr::Zero, _) => Self::zero(),
            (_, Repr::Zero) | (Repr::Inf, _) => Self::inf(),
            (_, Repr::Inf) => Self::zero(),
            (Repr::Finite { man: ma, exp: ea }, Repr::Finite { man: mb, exp: eb }) => {
                let num = (ma as u128) << 64;
                let q = num.div_ceil(mb as u128);
                Self::from_parts(q, ea as i128 - eb as i128 - 64, true)
            }
        }
    }

    /// Upper bound for `self / k`.
    pub fn div_u64(&self, k: u64) -> Self {
        self.div_u64_rounded(k, true)
    }

    /// Lower bound for `self / k`.
    pub fn div_u64_lower(&self, k: u64) -> Self {
        self.div_u64_rounded(k, false)
    }

    fn div_u64_rounded(&self, k: u64, up: bool) -> Self {
        match self.0 {
            Repr::Zero => Self::zero(),
            Repr::Inf => Self::inf(),
            Repr::Finite { .. } if k == 0 => Self::inf(),
            Repr::Finite { man, exp } => {
                let num = (man as u128) << 64;
                let q = if up {
                    num.div_ceil(k as u128)
                } else {
                    num / k as u128
                };
                Self::from_parts(q, exp as i128 - MAG_BITS as i128 - 64, up)
            }
        }
    }

    /// Compare against `2^e`.
    pub fn cmp_2exp(&self, e: i64) -> Ordering {
        self.cmp(&Self::pow2(e))
    }

    /// Approximate conversion to `f64` (exact when in range, since the
    /// mantissa has 30 bits). Out-of-range values give 0 or ∞.
    pub fn to_f64(&self) -> f64 {
        match self.0 {
            Repr::Zero => 0.0,
            Repr::Inf => f64::INFINITY,
            Repr::Finite { man, exp } => ldexp(man as f64, exp - MAG_BITS as i64),
        }
    }

    /// Exact rational value; `None` for +∞.
    pub fn to_rational(&self) -> Option<BigRational> {
        let (man, e) = self.raw_parts()?;
        Some(pow2_rational(BigInt::from(man), e))
    }

    /// Upper bound for `e^self`.
    pub fn exp_upper(&self) -> Self {
        match self.0 {
            Repr::Zero => Self::one(),
            Repr::Inf => Self::inf(),
            Repr::Finite { .. } => {
                if self.cmp_2exp(-20) == Ordering::Less {
                    // e^x ≤ 1 + 2x for x ≤ 1
                    return Self::one().add(&self.mul_2exp(1));
                }
                if self.cmp_2exp(62) == Ordering::Greater {
                    return Self::inf();
                }
                let x = self.to_f64();
                if x <= 512.0 {
                    Self::from_f64_upper(x.exp() * (1.0 + 1e-10))
                } else {
                    let t = x * std::f64::consts::LOG2_E * (1.0 + 1e-12);
                    Self::pow2(t.ceil() as i64 + 1)
                }
            }
        }
    }

    /// Upper bound for the exponential series tail `Σ_{k≥n} x^k / k!`.
    ///
    /// When `2x ≤ n + 1` the terms decrease at least geometrically with
    /// ratio 1/2, giving `2 · x^n / n!`. Otherwise the whole series `e^x`
    /// is used.
    pub fn exp_tail(&self, n: u64) -> Self {
        if n == 0 || self.is_inf() {
            return self.exp_upper();
        }
        if self.is_zero() {
            return Self::zero();
        }
        let limit = Self::from_u64_lower(n.saturating_add(1));
        if self.mul_2exp(1).cmp(&limit) == Ordering::Greater {
            return self.exp_upper();
        }
        let mut t = Self::one();
        for k in 1..=n {
            t = t.mul(self).div_u64(k);
        }
        t.mul_2exp(1)
    }

    /// Smallest `n ≥ 1` with `exp_tail(n) ≤ target`, and that bound.
    ///
    /// `x^n / n!` is carried from one candidate to the next, so the search
    /// costs one multiplication and one division per step. With no such
    /// `n` (infinite `self`, or zero `target` and nonzero `self`) the
    /// result is `n = 1` with its bound.
    pub fn exp_tail_terms(&self, target: &Self) -> (u64, Self) {
        if self.is_inf() || (target.is_zero() && !self.is_zero()) {
            return (1, self.exp_tail(1));
        }
        let two_x = self.mul_2exp(1);
        let mut n = 1u64;
        let mut term = Self::one().mul(self).div_u64(1);
        loop {
            let limit = Self::from_u64_lower(n.saturating_add(1));
            let tail = if two_x.cmp(&limit) == Ordering::Greater {
                self.exp_upper()
            } else {
                term.mul_2exp(1)
            };
            if tail <= *target {
                return (n, tail);
            }
            n += 1;
            term = term.mul(self).div_u64(n);
        }
    }
}

impl PartialOrd for Mag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mag {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Repr::Zero, Repr::Zero) | (Repr::Inf, Repr::Inf) => Ordering::Equal,
            (Repr::Zero, _) | (_, Repr::Inf) => Ordering::Less,
            (_, Repr::Zero) | (Repr::Inf, _) => Ordering::Greater,
            (Repr::Finite { man: ma, exp: ea }, Repr::Finite { man: mb, exp: eb }) => {
                ea.cmp(&eb).then(ma.cmp(&mb))
            }
        }
    }
}

impl Default for Mag {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Mag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Zero => f.write_str("0"),
            Repr::Inf => f.write_str("inf"),
            Repr::Finite { exp, .. } => {
                let v = self.to_f64();
                if v.is_finite() && v > 0.0 {
                    write!(f, "{v:.3e}")
                } else {
                    write!(f, "2^{exp}")
                }
            }
        }
    }
}

/// `m · 2^e` in `f64`, saturating to 0 or ±∞ outside the double range.
pub(crate) fn ldexp(m: f64, e: i64) -> f64 {
    if m == 0.0 {
        return 0.0;
    }
    let mut v = m;
    let mut e = e.clamp(-2200, 2200) as i32;
    while e > 1000 {
        v *= 2f64.powi(1000);
        e -= 1000;
    }
    while e < -1000 {
        v *= 2f64.powi(-1000);
        e += 1000;
    }
    v * 2f64.powi(e)
}

/// Exact rational `m · 2^e`.
pub(crate) fn pow2_rational(m: BigInt, e: i64) -> BigRational {
    if e >= 0 {
        BigRational::from_integer(m << e as usize)
    } else {
        BigRational::new(m, BigInt::from(1) << e.unsigned_abs() as usize)
    }
}
