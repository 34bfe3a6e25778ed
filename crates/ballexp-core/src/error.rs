//! # Error Types — Parse and Shape Failures
//!
//! Defines the error types used throughout the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Numerical operations on balls are total and never fail. Errors only
//!   arise at API boundaries: malformed text input, invalid shapes, or a
//!   precision below the supported minimum.
//! - Shape errors carry the offending dimensions so callers can report
//!   them without re-inspecting the matrix.

use thiserror::Error;

/// Top-level error type for the ball arithmetic workspace.
#[derive(Error, Debug)]
pub enum BallExpError {
    /// Text could not be parsed into a ball.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A matrix operation was called with invalid operands.
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Error while parsing a ball from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or only whitespace.
    #[error("empty input")]
    Empty,

    /// The numeric literal was malformed.
    #[error("invalid number literal {literal:?}: {reason}")]
    InvalidLiteral {
        /// The offending literal.
        literal: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A fraction had a zero denominator.
    #[error("zero denominator in {0:?}")]
    ZeroDenominator(String),

    /// A radius was negative.
    #[error("radius must be non-negative, got {0:?}")]
    NegativeRadius(String),
}

/// Error in matrix construction or arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The operation requires a square matrix.
    #[error("a square matrix is required, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Operand shapes do not agree.
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        /// Shape required by the operation.
        expected: (usize, usize),
        /// Shape actually supplied.
        found: (usize, usize),
    },

    /// A row had a different length from the first row.
    #[error("row {row} has {len} entries, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Length of the first row.
        expected: usize,
    },

    /// Precision outside the supported range.
    #[error(
        "precision must be between {min} and {max} bits, got {0}",
        min = crate::MIN_PREC,
        max = crate::MAX_PREC
    )]
    InvalidPrecision(u64),
}
