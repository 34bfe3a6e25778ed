//! # Matrix Exponential
//!
//! Top-level driver. For a square ball matrix `A` and target precision
//! `prec`:
//!
//! 1. dimension 0 returns the empty matrix and dimension 1 the scalar
//!    exponential;
//! 2. diagonal matrices are exponentiated entrywise;
//! 3. otherwise `A` is scaled by `2^-r`, the truncated Taylor series is
//!    evaluated at working precision, the tail bound is injected, exactly
//!    known positions are restored, the result is squared `r` times and
//!    finally rounded to `prec`.
//!
//! ## Aliasing
//!
//! The computation reads its input through a shared reference and builds
//! a fresh output, so [`exp_in_place`] is the same computation followed by
//! a move. [`exp_into`] writes into a caller-owned matrix of the same
//! shape.

use ballexp_core::{Ball, MatrixError, MAX_PREC, MIN_PREC};
use serde::Serialize;

use crate::config::ExpConfig;
use crate::matrix::BallMatrix;
use crate::order::choose_terms;
use crate::planner::scaling_exponent;
use crate::structure::StructureMatrix;
use crate::tail::{inject_tail, tail_bound};
use crate::taylor::taylor_sum;

/// How an exponential was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpPath {
    /// 0 × 0 input.
    Empty,
    /// 1 × 1 input, via the scalar exponential.
    Scalar,
    /// Diagonal input, entrywise scalar exponentials.
    Diagonal,
    /// Norm bound exactly zero; the result is the identity.
    ZeroNorm,
    /// Full scaling and squaring.
    ScalingSquaring,
}

/// Diagnostic record of one exponential evaluation.
///
/// Magnitudes are reported as approximate `f64` values; an unbounded tail
/// is `inf` and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpPlan {
    /// Matrix dimension.
    pub dim: usize,
    /// Requested precision in bits.
    pub prec: u64,
    /// Evaluation path taken.
    pub path: ExpPath,
    /// Working precision of the series and squarings (equal to `prec` on
    /// the shortcut paths).
    pub working_prec: u64,
    /// Infinity-norm bound of the input.
    pub norm: f64,
    /// Norm bound after scaling by `2^-scaling`.
    pub scaled_norm: f64,
    /// Scaling exponent `r`; the series result is squared `r` times.
    pub scaling: u64,
    /// Number of Taylor terms `N`.
    pub terms: u64,
    /// Bound on the discarded series tail injected into every entry.
    pub tail: f64,
    /// Whether exactly known positions were detected and restored.
    pub structured: bool,
}

impl ExpPlan {
    fn shortcut(dim: usize, prec: u64, path: ExpPath) -> Self {
        Self {
            dim,
            prec,
            path,
            working_prec: prec,
            norm: 0.0,
            scaled_norm: 0.0,
            scaling: 0,
            terms: 0,
            tail: 0.0,
            structured: false,
        }
    }
}

/// Result matrix together with its evaluation plan.
#[derive(Debug, Clone)]
pub struct ExpOutcome<T> {
    /// Enclosure of `exp(A)`.
    pub matrix: BallMatrix<T>,
    /// How it was computed.
    pub plan: ExpPlan,
}

/// Enclosure of `exp(a)` at `prec` bits with the default configuration.
pub fn exp<T: Ball>(a: &BallMatrix<T>, prec: u64) -> Result<BallMatrix<T>, MatrixError> {
    exp_with(a, prec, &ExpConfig::default()).map(|outcome| outcome.matrix)
}

/// Store the enclosure of `exp(a)` into `out`, which must have `a`'s shape.
pub fn exp_into<T: Ball>(
    out: &mut BallMatrix<T>,
    a: &BallMatrix<T>,
    prec: u64,
) -> Result<(), MatrixError> {
    if out.shape() != a.shape() {
        return Err(MatrixError::DimensionMismatch {
            expected: a.shape(),
            found: out.shape(),
        });
    }
    *out = exp(a, prec)?;
    Ok(())
}

/// Replace `a` with the enclosure of `exp(a)`. On error `a` is unchanged.
pub fn exp_in_place<T: Ball>(a: &mut BallMatrix<T>, prec: u64) -> Result<(), MatrixError> {
    *a = exp(a, prec)?;
    Ok(())
}

/// Enclosure of `exp(a)` at `prec` bits, with its evaluation plan.
pub fn exp_with<T: Ball>(
    a: &BallMatrix<T>,
    prec: u64,
    config: &ExpConfig,
) -> Result<ExpOutcome<T>, MatrixError> {
    let dim = a.check_square()?;
    if !(MIN_PREC..=MAX_PREC).contains(&prec) {
        return Err(MatrixError::InvalidPrecision(prec));
    }

    if dim == 0 {
        return Ok(ExpOutcome {
            matrix: BallMatrix::zeros(0, 0),
            plan: ExpPlan::shortcut(0, prec, ExpPath::Empty),
        });
    }
    if dim == 1 {
        tracing::debug!(prec, "exponential of a 1x1 matrix");
        return Ok(ExpOutcome {
            matrix: BallMatrix::from_fn(1, 1, |_, _| a[(0, 0)].exp(prec)),
            plan: ExpPlan::shortcut(1, prec, ExpPath::Scalar),
        });
    }
    if config.diagonal_fast_path && a.is_diagonal() {
        tracing::debug!(dim, prec, "exponential of a diagonal matrix");
        let matrix =
            BallMatrix::from_fn(dim, dim, |i, j| if i == j { a[(i, i)].exp(prec) } else { T::zero() });
        return Ok(ExpOutcome {
            matrix,
            plan: ExpPlan::shortcut(dim, prec, ExpPath::Diagonal),
        });
    }

    let wp = config.working_precision(prec);
    let norm = a.bound_inf_norm();
    let mut plan = ExpPlan {
        working_prec: wp,
        norm: norm.to_f64(),
        ..ExpPlan::shortcut(dim, prec, ExpPath::ZeroNorm)
    };
    if norm.is_zero() {
        tracing::debug!(dim, prec, "zero norm bound, result is the identity");
        return Ok(ExpOutcome {
            matrix: BallMatrix::identity(dim),
            plan,
        });
    }

    let structure = (config.detect_structure && a.any_is_zero()).then(|| StructureMatrix::of(a));

    let r = scaling_exponent(&norm, wp);
    let shift = -(r as i64);
    let scaled = a.scalar_mul_2exp(shift);
    let scaled_norm = norm.mul_2exp(shift);
    let terms = choose_terms(&scaled_norm, wp);
    let err = tail_bound(&scaled_norm, terms);

    tracing::debug!(
        dim,
        prec,
        wp,
        r,
        terms,
        structured = structure.is_some(),
        norm = %norm,
        tail = %err,
        "scaling and squaring"
    );

    let mut b = taylor_sum(&scaled, terms, wp);
    inject_tail(&mut b, &err);
    if let Some(s) = &structure {
        s.pin(&mut b);
    }
    for _ in 0..r {
        b = b.mul_unchecked(&b, wp);
    }

    plan.path = ExpPath::ScalingSquaring;
    plan.scaled_norm = scaled_norm.to_f64();
    plan.scaling = r;
    plan.terms = terms;
    plan.tail = err.to_f64();
    plan.structured = structure.is_some();

    Ok(ExpOutcome {
        matrix: b.round(prec),
        plan,
    })
}
