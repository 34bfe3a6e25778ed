//! # Text Input
//!
//! Exact decimal and fractional literals, and real balls written as
//! `mid`, `mid +/- rad` or `mid ± rad`.
//!
//! Literals are parsed exactly into rationals; rounding to a binary
//! midpoint happens once, with the error folded into the radius, so a
//! parsed ball always contains the value that was written.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::error::ParseError;
use crate::mag::Mag;
use crate::real::RealBall;

/// Decimal exponents beyond this magnitude are rejected rather than
/// expanded into enormous integers.
pub const MAX_DECIMAL_EXPONENT: i64 = 100_000;

fn invalid(literal: &str, reason: &str) -> ParseError {
    ParseError::InvalidLiteral {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an exact rational: `-12`, `3.25`, `1e-3`, `-2.5E+4` or `7/3`.
pub fn parse_rational(text: &str) -> Result<BigRational, ParseError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some((num, den)) = s.split_once('/') {
        let n = parse_integer(num.trim(), s)?;
        let d = parse_integer(den.trim(), s)?;
        if d.is_zero() {
            return Err(ParseError::ZeroDenominator(s.to_string()));
        }
        return Ok(BigRational::new(n, d));
    }
    parse_decimal(s)
}

fn parse_integer(digits: &str, literal: &str) -> Result<BigInt, ParseError> {
    let (neg, body) = split_sign(digits);
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(literal, "expected an integer"));
    }
    let n = BigInt::parse_bytes(body.as_bytes(), 10)
        .ok_or_else(|| invalid(literal, "expected an integer"))?;
    Ok(if neg { -n } else { n })
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

fn parse_decimal(s: &str) -> Result<BigRational, ParseError> {
    let (neg, body) = split_sign(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid(s, "missing digits"));
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid(s, "unexpected character"));
    }

    let mut exp10: i64 = match exponent {
        None => 0,
        Some(e) => {
            let (eneg, edigits) = split_sign(e);
            if edigits.is_empty() || !edigits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(s, "malformed exponent"));
            }
            let v: i64 = edigits
                .parse()
                .ok()
                .filter(|v: &i64| *v <= MAX_DECIMAL_EXPONENT)
                .ok_or_else(|| invalid(s, "exponent out of range"))?;
            if eneg {
                -v
            } else {
                v
            }
        }
    };
    exp10 -= frac_part.len() as i64;

    let digits = format!("{int_part}{frac_part}");
    let mut n = BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| invalid(s, "missing digits"))?;
    if neg {
        n = -n;
    }
    let ten = BigInt::from(10u32);
    let value = if exp10 >= 0 {
        BigRational::from_integer(n * num_traits::pow(ten, exp10 as usize))
    } else {
        BigRational::new(n, num_traits::pow(ten, exp10.unsigned_abs() as usize))
    };
    Ok(value)
}

impl RealBall {
    /// Parse `mid`, `mid +/- rad` or `mid ± rad`, rounding the midpoint
    /// to `prec` bits. The radius is rounded upward.
    pub fn parse(text: &str, prec: u64) -> Result<Self, ParseError> {
        let s = text.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let (mid_text, rad_text) = match s.split_once("+/-").or_else(|| s.split_once('±')) {
            Some((m, r)) => (m, Some(r)),
            None => (s, None),
        };
        let mid = parse_rational(mid_text)?;
        let mut ball = RealBall::from_rational(&mid, prec);
        if let Some(r) = rad_text {
            let rad = parse_rational(r)?;
            if rad.is_negative() {
                return Err(ParseError::NegativeRadius(r.trim().to_string()));
            }
            ball.add_error(&Mag::from_rational_upper(&rad));
        }
        Ok(ball)
    }
}

impl std::str::FromStr for RealBall {
    type Err = ParseError;

    /// Parses at 128 bits of midpoint precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RealBall::parse(s, 128)
    }
}
