//! # ballexp-mat — Ball Matrices & the Matrix Exponential
//!
//! Computes rigorous enclosures of `exp(A)` for square matrices of real or
//! complex balls:
//!
//! - **Matrix** (`matrix.rs`): `BallMatrix<T>`, dense and row-major, generic
//!   over the [`Ball`](ballexp_core::Ball) entry kind.
//!
//! - **Structure** (`structure.rs`): reachability closure of the nonzero
//!   pattern, used to restore exactly known zeros and ones in the result.
//!
//! - **Planner** (`planner.rs`) and **Order** (`order.rs`): the scaling
//!   exponent `r` and the Taylor term count `N` from an infinity-norm bound.
//!
//! - **Taylor** (`taylor.rs`): Paterson–Stockmeyer evaluation of the
//!   truncated series with exact integer coefficients.
//!
//! - **Tail** (`tail.rs`): bound on the discarded series tail and its
//!   injection into every entry.
//!
//! - **Exp** (`exp.rs`): the scaling-and-squaring driver and its diagnostic
//!   [`ExpPlan`].
//!
//! ## Soundness Invariant
//!
//! For every point matrix `A'` inside the input enclosure, the returned
//! matrix contains `exp(A')`. The truncation order and scaling only affect
//! cost and width; the tail actually discarded is always bounded and added.
//!
//! ## Threading
//!
//! All functions are synchronous and hold no shared state. Independent
//! exponentials may run concurrently on different threads.

pub mod config;
pub mod exp;
pub mod matrix;
pub mod order;
pub mod planner;
pub mod structure;
pub mod tail;
pub mod taylor;

pub use config::{ExpConfig, MAX_GUARD_BITS_FACTOR};
pub use exp::{exp, exp_in_place, exp_into, exp_with, ExpOutcome, ExpPath, ExpPlan};
pub use matrix::{BallMatrix, ComplexMatrix, RealMatrix};
pub use structure::StructureMatrix;
