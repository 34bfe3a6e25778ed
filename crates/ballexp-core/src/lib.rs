//! # ballexp-core — Ball Arithmetic Foundations
//!
//! This crate defines the scalar layer of the ball matrix exponential:
//! rigorous error bounds, exact binary midpoints and the real and complex
//! balls built from them. `ballexp-mat` depends on it; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Enclosure soundness.** Every operation on a ball returns a ball
//!    containing the exact result for every point of its inputs. Radii are
//!    [`Mag`] values, which only ever round upward.
//!
//! 2. **Exact midpoints.** [`Float`] is an arbitrary-size mantissa with a
//!    binary exponent. Rounding to a target precision is explicit and always
//!    reports its error, so no rounding can be silently dropped.
//!
//! 3. **One algorithm, two fields.** The [`Ball`] trait is implemented by
//!    [`RealBall`] and [`ComplexBall`]. Matrix algorithms are generic over it.
//!
//! 4. **Total arithmetic.** Overflow turns a ball into `0 ± ∞` and underflow
//!    folds the midpoint into the radius. Only text parsing and shape
//!    checks return errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ballexp-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod complex;
pub mod error;
pub mod float;
pub mod mag;
pub mod parse;
pub mod real;
pub mod scalar;

// Re-export primary types for ergonomic imports.
pub use complex::ComplexBall;
pub use error::{BallExpError, MatrixError, ParseError};
pub use float::{format_decimal, Float};
pub use mag::Mag;
pub use parse::parse_rational;
pub use real::RealBall;
pub use scalar::{exp_series, Ball};

/// Smallest supported target precision in bits.
pub const MIN_PREC: u64 = 2;

/// Largest supported target precision in bits. Keeps every derived
/// working precision and scaling exponent well inside `i64`.
pub const MAX_PREC: u64 = 1 << 32;

/// Number of significant bits of `x`; zero for zero.
pub fn bit_count(x: u64) -> u64 {
    u64::from(64 - x.leading_zeros())
}
