//! # Taylor Evaluation
//!
//! `Σ_{k<N} A^k / k!` by the Paterson–Stockmeyer scheme: the powers
//! `A^0 … A^m` with `m = ⌊√N⌋` are computed once, the terms are split into
//! blocks of `m`, and the blocks are combined Horner-style with `A^m`.
//!
//! Coefficients stay integral. Inside a block the partial factorials are
//! built up by multiplication; across blocks the accumulator is scaled by
//! a running common denominator, and a single division by that
//! denominator finishes the sum.

use ballexp_core::Ball;
use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::One;

use crate::matrix::BallMatrix;

/// Truncated exponential series of the square matrix `a` with `terms`
/// terms at working precision `wp`. `terms == 0` is treated as 1.
pub fn taylor_sum<T: Ball>(a: &BallMatrix<T>, terms: u64, wp: u64) -> BallMatrix<T> {
    debug_assert!(a.is_square());
    let dim = a.rows();
    match terms {
        0 | 1 => BallMatrix::identity(dim),
        2 => BallMatrix::identity(dim).add_unchecked(a, wp),
        3 => {
            let half_sq = a.mul_unchecked(a, wp).scalar_mul_2exp(-1);
            a.add_unchecked(&half_sq, wp)
                .add_unchecked(&BallMatrix::identity(dim), wp)
        }
        n => paterson_stockmeyer(a, n, wp),
    }
}

fn paterson_stockmeyer<T: Ball>(a: &BallMatrix<T>, n: u64, wp: u64) -> BallMatrix<T> {
    let dim = a.rows();
    let m = n.sqrt();
    let blocks = n.div_ceil(m);

    // Released with the frame on every return path.
    let mut pows: Vec<BallMatrix<T>> = Vec::with_capacity(m as usize + 1);
    pows.push(BallMatrix::identity(dim));
    pows.push(a.clone());
    for i in 2..=m as usize {
        let next = pows[i - 1].mul_unchecked(a, wp);
        pows.push(next);
    }
    tracing::trace!(terms = n, baby_steps = m, blocks, "taylor evaluation");

    let mut s = BallMatrix::zeros(dim, dim);
    let mut f = BigInt::one();
    for i in (0..blocks).rev() {
        let lo = i * m;
        let mut hi = (n - 1).min(lo + m - 1);
        let mut block = BallMatrix::zeros(dim, dim);
        let mut c = BigInt::one();
        loop {
            block.scalar_addmul_bigint(&pows[(hi - lo) as usize], &c, wp);
            if hi != 0 {
                c *= hi;
            }
            if hi == lo {
                break;
            }
            hi -= 1;
        }
        let giant = pows[m as usize].mul_unchecked(&s, wp);
        s = block.scalar_mul_bigint(&f, wp).add_unchecked(&giant, wp);
        f *= &c;
    }
    s.scalar_div_bigint(&f, wp)
}
