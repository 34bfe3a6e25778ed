//! # Structure Analysis
//!
//! Every term `A^k / k!` of the exponential series can be nonzero at
//! `(i, j)` only if there is a path `i → … → j` through nonzero entries of
//! `A`. The reachability closure of the nonzero pattern therefore marks
//! every position that can carry a nonzero value. All other positions of
//! `exp(A)` are exactly zero off the diagonal and exactly one on it.
//!
//! Pinning those positions after tail injection keeps the tail bound and
//! accumulated rounding from widening entries that are known exactly.
//!
//! Block-diagonal structure under a permutation is not detected beyond
//! what the reachability pattern already captures.

use std::fmt;

use ballexp_core::Ball;

use crate::matrix::BallMatrix;

/// Reachability pattern of a square ball matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureMatrix {
    dim: usize,
    reach: Vec<bool>,
}

impl StructureMatrix {
    /// Closure of the nonzero pattern of `a`. `a` must be square.
    pub fn of<T: Ball>(a: &BallMatrix<T>) -> Self {
        debug_assert!(a.is_square());
        let dim = a.rows();
        let reach = a.entries().iter().map(|x| !x.is_zero()).collect();
        let mut s = Self { dim, reach };
        s.close();
        s
    }

    /// Warshall's transitive closure, in place.
    fn close(&mut self) {
        let n = self.dim;
        for k in 0..n {
            for i in 0..n {
                if !self.reach[i * n + k] {
                    continue;
                }
                for j in 0..n {
                    if self.reach[k * n + j] {
                        self.reach[i * n + j] = true;
                    }
                }
            }
        }
    }

    /// Dimension of the analysed matrix.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `true` when `(i, j)` may be nonzero in some power `A^k`, `k ≥ 1`.
    pub fn is_reachable(&self, i: usize, j: usize) -> bool {
        self.reach[i * self.dim + j]
    }

    /// Number of reachable positions.
    pub fn reachable_count(&self) -> usize {
        self.reach.iter().filter(|&&r| r).count()
    }

    /// Overwrite unreachable positions of `b` with their exact values:
    /// one on the diagonal, zero elsewhere.
    pub fn pin<T: Ball>(&self, b: &mut BallMatrix<T>) {
        debug_assert_eq!(b.shape(), (self.dim, self.dim));
        for i in 0..self.dim {
            for j in 0..self.dim {
                if !self.is_reachable(i, j) {
                    b[(i, j)] = if i == j { T::one() } else { T::zero() };
                }
            }
        }
    }

    /// Rows of `0`/`1` flags.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.dim)
            .map(|i| (0..self.dim).map(|j| u8::from(self.is_reachable(i, j))).collect())
            .collect()
    }
}

impl fmt::Display for StructureMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            let line: Vec<String> = row.iter().map(u8::to_string).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
