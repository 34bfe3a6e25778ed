//! # Ball Matrices
//!
//! A dense, row-major matrix of balls. Generic over the entry kind via
//! [`Ball`], with [`RealMatrix`] and [`ComplexMatrix`] as the two
//! instantiations.
//!
//! ## Checked and Unchecked Arithmetic
//!
//! The public `add`, `mul` and `sqr` validate shapes and return
//! [`MatrixError`] on mismatch. The exponential works on matrices whose
//! shapes it has already validated and uses the `*_unchecked` forms, which
//! only `debug_assert!` their preconditions.

use std::fmt;
use std::ops::{Index, IndexMut};

use ballexp_core::{Ball, ComplexBall, Mag, MatrixError, RealBall};
use num_bigint::BigInt;
use num_rational::BigRational;

/// A `rows × cols` matrix of balls.
#[derive(Debug, Clone, PartialEq)]
pub struct BallMatrix<T> {
    rows: usize,
    cols: usize,
    entries: Vec<T>,
}

/// Matrix of real balls.
pub type RealMatrix = BallMatrix<RealBall>;

/// Matrix of complex balls.
pub type ComplexMatrix = BallMatrix<ComplexBall>;

impl<T: Ball> BallMatrix<T> {
    /// Matrix of exact zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![T::zero(); rows * cols],
        }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    /// Matrix whose `(i, j)` entry is `f(i, j)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut entries = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                entries.push(f(i, j));
            }
        }
        Self {
            rows,
            cols,
            entries,
        }
    }

    /// Matrix from a list of rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut entries = Vec::with_capacity(nrows * ncols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != ncols {
                return Err(MatrixError::Ragged {
                    row: i,
                    len: row.len(),
                    expected: ncols,
                });
            }
            entries.extend(row);
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            entries,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `true` when `rows == cols`.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// The dimension of a square matrix.
    pub fn check_square(&self) -> Result<usize, MatrixError> {
        if self.is_square() {
            Ok(self.rows)
        } else {
            Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Entry `(i, j)`, or `None` when out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.rows && j < self.cols {
            self.entries.get(i * self.cols + j)
        } else {
            None
        }
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.entries[i * self.cols..(i + 1) * self.cols]
    }

    /// All entries in row-major order.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    fn expect_shape(&self, other: &Self) -> Result<(), MatrixError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(MatrixError::DimensionMismatch {
                expected: self.shape(),
                found: other.shape(),
            })
        }
    }

    /// Entrywise sum at `prec` bits.
    pub fn add(&self, other: &Self, prec: u64) -> Result<Self, MatrixError> {
        self.expect_shape(other)?;
        Ok(self.add_unchecked(other, prec))
    }

    /// Matrix product at `prec` bits.
    pub fn mul(&self, other: &Self, prec: u64) -> Result<Self, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                expected: (self.cols, other.cols),
                found: other.shape(),
            });
        }
        Ok(self.mul_unchecked(other, prec))
    }

    /// `self · self` at `prec` bits.
    pub fn sqr(&self, prec: u64) -> Result<Self, MatrixError> {
        self.check_square()?;
        Ok(self.mul_unchecked(self, prec))
    }

    pub(crate) fn add_unchecked(&self, other: &Self, prec: u64) -> Self {
        debug_assert_eq!(self.shape(), other.shape());
        Self {
            rows: self.rows,
            cols: self.cols,
            entries: self
                .entries
                .iter()
                .zip(&other.entries)
                .map(|(a, b)| a.add(b, prec))
                .collect(),
        }
    }

    pub(crate) fn mul_unchecked(&self, other: &Self, prec: u64) -> Self {
        debug_assert_eq!(self.cols, other.rows);
        let inner = self.cols;
        Self::from_fn(self.rows, other.cols, |i, j| {
            let mut acc = T::zero();
            for k in 0..inner {
                let a = &self[(i, k)];
                let b = &other[(k, j)];
                // Exact zeros contribute nothing, not even error.
                if a.is_zero() || b.is_zero() {
                    continue;
                }
                acc = acc.add(&a.mul(b, prec), prec);
            }
            acc
        })
    }

    /// Upper bound for the infinity norm `max_i Σ_j |a_ij|`.
    pub fn bound_inf_norm(&self) -> Mag {
        (0..self.rows)
            .map(|i| {
                self.row(i)
                    .iter()
                    .fold(Mag::zero(), |s, x| s.add(&x.mag_upper()))
            })
            .max()
            .unwrap_or_else(Mag::zero)
    }

    /// `true` when every off-diagonal entry is exactly zero.
    pub fn is_diagonal(&self) -> bool {
        (0..self.rows).all(|i| (0..self.cols).all(|j| i == j || self[(i, j)].is_zero()))
    }

    /// `true` when at least one entry is exactly zero.
    pub fn any_is_zero(&self) -> bool {
        self.entries.iter().any(Ball::is_zero)
    }

    /// `true` when every radius is finite.
    pub fn is_finite(&self) -> bool {
        self.entries.iter().all(Ball::is_finite)
    }

    /// Exact scaling of every entry by `2^e`.
    pub fn scalar_mul_2exp(&self, e: i64) -> Self {
        self.map(|x| x.mul_2exp(e))
    }

    /// Every entry times the integer `c`, at `prec` bits.
    pub fn scalar_mul_bigint(&self, c: &BigInt, prec: u64) -> Self {
        self.map(|x| x.mul_bigint(c, prec))
    }

    /// `self += x · c` entrywise, at `prec` bits.
    pub fn scalar_addmul_bigint(&mut self, x: &Self, c: &BigInt, prec: u64) {
        debug_assert_eq!(self.shape(), x.shape());
        for (s, t) in self.entries.iter_mut().zip(&x.entries) {
            s.addmul_bigint(t, c, prec);
        }
    }

    /// Every entry divided by the nonzero integer `c`, at `prec` bits.
    pub fn scalar_div_bigint(&self, c: &BigInt, prec: u64) -> Self {
        self.map(|x| x.div_bigint(c, prec))
    }

    /// Widen every entry by `err`.
    pub fn add_error(&mut self, err: &Mag) {
        for x in &mut self.entries {
            x.add_error(err);
        }
    }

    /// Round every midpoint to `prec` bits.
    pub fn round(&self, prec: u64) -> Self {
        self.map(|x| x.round(prec))
    }

    /// `true` when the shapes agree and every entry of `other` lies inside
    /// the corresponding entry of `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && self.entries.iter().zip(&other.entries).all(|(a, b)| a.contains(b))
    }

    /// `true` when the shapes agree and every pair of entries intersects.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && self.entries.iter().zip(&other.entries).all(|(a, b)| a.overlaps(b))
    }

    fn map(&self, f: impl FnMut(&T) -> T) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            entries: self.entries.iter().map(f).collect(),
        }
    }
}

impl RealMatrix {
    /// Enclosure of an exact rational matrix at `prec` bits.
    pub fn from_rationals(rows: &[Vec<BigRational>], prec: u64) -> Result<Self, MatrixError> {
        Self::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|q| RealBall::from_rational(q, prec)).collect())
                .collect(),
        )
    }

    /// `true` when the exact rational matrix lies inside `self`.
    pub fn contains_rationals(&self, rows: &[Vec<BigRational>]) -> bool {
        rows.len() == self.rows
            && rows.iter().enumerate().all(|(i, row)| {
                row.len() == self.cols
                    && row
                        .iter()
                        .zip(self.row(i))
                        .all(|(q, x)| x.contains_rational(q))
            })
    }
}

impl ComplexMatrix {
    /// Complex matrix from real and imaginary parts of equal shape.
    pub fn from_parts(re: &RealMatrix, im: &RealMatrix) -> Result<Self, MatrixError> {
        re.expect_shape(im)?;
        Ok(Self::from_fn(re.rows, re.cols, |i, j| {
            ComplexBall::new(re[(i, j)].clone(), im[(i, j)].clone())
        }))
    }
}

impl From<&RealMatrix> for ComplexMatrix {
    fn from(re: &RealMatrix) -> Self {
        Self::from_fn(re.rows, re.cols, |i, j| ComplexBall::from_real(re[(i, j)].clone()))
    }
}

impl<T> Index<(usize, usize)> for BallMatrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of range");
        &self.entries[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for BallMatrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of range");
        &mut self.entries[i * self.cols + j]
    }
}

impl<T: Ball> fmt::Display for BallMatrix<T> {
    /// One bracketed row per line; the formatter precision is passed to
    /// every entry.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(15);
        for i in 0..self.rows {
            f.write_str("[")?;
            for (j, x) in self.row(i).iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{x:.digits$}")?;
            }
            f.write_str("]\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[i64]]) -> RealMatrix {
        RealMatrix::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&x| RealBall::from_i64(x)).collect())
                .collect(),
        )
        .unwrap()
    }

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    #[test]
    fn test_identity_and_zeros() {
        let i3 = RealMatrix::identity(3);
        assert!(i3.is_diagonal());
        assert_eq!(i3[(1, 1)], RealBall::one());
        assert!(i3[(0, 2)].is_zero());
        assert!(RealMatrix::zeros(2, 3).any_is_zero());
        assert_eq!(RealMatrix::zeros(2, 3).shape(), (2, 3));
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let err = RealMatrix::from_rows(vec![
            vec![RealBall::one(), RealBall::one()],
            vec![RealBall::one()],
        ])
        .unwrap_err();
        assert_eq!(
            err,
            MatrixError::Ragged {
                row: 1,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_mul_exact_integers() {
        let a = m(&[&[1, 2], &[3, 4]]);
        let b = m(&[&[0, 1], &[1, 0]]);
        let p = a.mul(&b, 64).unwrap();
        assert!(p.contains_rationals(&[vec![q(2), q(1)], vec![q(4), q(3)]]));
        assert_eq!(a.sqr(64).unwrap(), m(&[&[7, 10], &[15, 22]]));
    }

    #[test]
    fn test_shape_errors() {
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        let b = m(&[&[1, 2], &[3, 4]]);
        assert_eq!(
            a.sqr(64).unwrap_err(),
            MatrixError::NotSquare { rows: 2, cols: 3 }
        );
        assert!(matches!(
            a.add(&b, 64),
            Err(MatrixError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            a.mul(&b, 64),
            Err(MatrixError::DimensionMismatch { .. })
        ));
        assert_eq!(b.mul(&a, 64).unwrap().shape(), (2, 3));
    }

    #[test]
    fn test_bound_inf_norm() {
        let a = m(&[&[1, -2], &[-3, 1]]);
        let n = a.bound_inf_norm();
        assert!(n.to_f64() >= 4.0);
        assert!(n.to_f64() <= 4.0 * (1.0 + 1e-8));
        assert!(RealMatrix::zeros(3, 3).bound_inf_norm().is_zero());
        assert!(RealMatrix::zeros(0, 0).bound_inf_norm().is_zero());
    }

    #[test]
    fn test_add_error_and_contains() {
        let a = m(&[&[1, 0], &[0, 1]]);
        let mut b = a.clone();
        b.add_error(&Mag::pow2(-10));
        assert!(b.contains(&a));
        assert!(!a.contains(&b));
        assert!(a.overlaps(&b));
        assert!(!b.any_is_zero());
    }

    #[test]
    fn test_scalar_integer_ops() {
        let a = m(&[&[3, 6], &[9, 12]]);
        let c = BigInt::from(3);
        assert_eq!(a.scalar_div_bigint(&c, 64), m(&[&[1, 2], &[3, 4]]));
        assert_eq!(a.scalar_mul_bigint(&c, 64), m(&[&[9, 18], &[27, 36]]));
        let mut s = RealMatrix::zeros(2, 2);
        s.scalar_addmul_bigint(&a, &c, 64);
        s.scalar_addmul_bigint(&a, &BigInt::from(-2), 64);
        assert_eq!(s, a);
        assert_eq!(a.scalar_mul_2exp(-1).scalar_mul_2exp(1), a);
    }

    #[test]
    fn test_complex_from_parts() {
        let re = m(&[&[1, 0], &[0, 1]]);
        let im = m(&[&[0, 1], &[1, 0]]);
        let z = ComplexMatrix::from_parts(&re, &im).unwrap();
        assert_eq!(z[(0, 1)], ComplexBall::i());
        assert!(!z.is_diagonal());
        assert!(ComplexMatrix::from(&re).is_diagonal());
        assert!(ComplexMatrix::from_parts(&re, &m(&[&[1]])).is_err());
    }

    #[test]
    fn test_display_rows() {
        let a = m(&[&[1, 2], &[3, 4]]);
        let text = format!("{a:.3}");
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with('['));
    }
}
