//! Enclosure properties of the ball matrix exponential.
//!
//! References are either exact rationals (nilpotent and triangular
//! matrices), independent closed forms evaluated with the scalar
//! exponential, or the same point matrix at much higher precision.

use std::cmp::Ordering;

use ballexp_core::{ComplexBall, Float, Mag, RealBall};
use ballexp_mat::{exp, exp_in_place, exp_with, ComplexMatrix, ExpConfig, ExpPath, RealMatrix};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn q(n: i64, d: i64) -> BigRational {
    BigRational::new(n.into(), d.into())
}

fn real_matrix(rows: &[&[f64]]) -> RealMatrix {
    RealMatrix::from_rows(
        rows.iter()
            .map(|r| r.iter().map(|&x| RealBall::from_f64(x)).collect())
            .collect(),
    )
    .unwrap()
}

fn ball(mid: f64, rad: f64) -> RealBall {
    let mut b = RealBall::from_f64(mid);
    b.add_error(&Mag::from_f64_upper(rad));
    b
}

// ---------------------------------------------------------------------------
// Containment soundness
// ---------------------------------------------------------------------------

#[test]
fn sampled_points_are_contained() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mids = [[0.5, -1.25, 0.0], [2.0, 0.75, -0.5], [0.0, 1.5, -1.0]];
    let rad = 1e-3;
    let a = RealMatrix::from_fn(3, 3, |i, j| ball(mids[i][j], rad));
    let e = exp(&a, 64).unwrap();
    assert!(e.is_finite());

    for _ in 0..8 {
        let point = RealMatrix::from_fn(3, 3, |i, j| {
            let u: f64 = rng.gen_range(-0.99..0.99);
            RealBall::from_f64(mids[i][j] + u * rad)
        });
        let reference = exp(&point, 256).unwrap();
        assert!(e.contains(&reference), "{point}");
    }
}

#[test]
fn complex_sampled_points_are_contained() {
    let mut rng = StdRng::seed_from_u64(42);
    let mids = [[(0.25, 1.0), (-0.5, 0.0)], [(1.0, -0.75), (0.0, 0.5)]];
    let rad = 1e-4;
    let a = ComplexMatrix::from_fn(2, 2, |i, j| {
        let (re, im) = mids[i][j];
        ComplexBall::new(ball(re, rad), ball(im, rad))
    });
    let e = exp(&a, 80).unwrap();

    for _ in 0..6 {
        let point = ComplexMatrix::from_fn(2, 2, |i, j| {
            let (re, im) = mids[i][j];
            let (u, v): (f64, f64) = (rng.gen_range(-0.99..0.99), rng.gen_range(-0.99..0.99));
            ComplexBall::from_f64(re + u * rad, im + v * rad)
        });
        let reference = exp(&point, 256).unwrap();
        assert!(e.contains(&reference), "{point}");
    }
}

#[test]
fn rotation_matches_closed_form() {
    // exp([[0, t], [-t, 0]]) = [[cos t, sin t], [-sin t, cos t]]
    let t = 0.75;
    let a = real_matrix(&[&[0.0, t], &[-t, 0.0]]);
    let e = exp(&a, 80).unwrap();
    let expected = [[t.cos(), t.sin()], [-t.sin(), t.cos()]];
    for i in 0..2 {
        for j in 0..2 {
            let x = &e[(i, j)];
            assert!((x.mid().to_f64() - expected[i][j]).abs() < 1e-15);
            assert!(x.rad().cmp_2exp(-70) == Ordering::Less);
        }
    }
}

#[test]
fn upper_triangular_matches_divided_difference() {
    // exp([[a, b], [0, c]]) has (0,1) entry b (e^a - e^c) / (a - c).
    // With a = 1, c = -1, b = 2 this is e - 1/e.
    let m = real_matrix(&[&[1.0, 2.0], &[0.0, -1.0]]);
    let e = exp(&m, 100).unwrap();
    let ea = RealBall::from_i64(1).exp(200);
    let ec = RealBall::from_i64(-1).exp(200);
    assert!(e[(0, 0)].overlaps(&ea));
    assert!(e[(1, 1)].overlaps(&ec));
    assert!(e[(0, 1)].overlaps(&ea.sub(&ec, 200)));
    assert_eq!(e[(1, 0)], RealBall::zero());
}

#[test]
fn nilpotent_closed_form() {
    let a = real_matrix(&[&[0.0, 1.0], &[0.0, 0.0]]);
    let e = exp(&a, 64).unwrap();
    assert!(e.contains_rationals(&[vec![q(1, 1), q(1, 1)], vec![q(0, 1), q(1, 1)]]));
}

#[test]
fn strictly_triangular_closed_form() {
    // N = [[0, 1, 2], [0, 0, 3], [0, 0, 0]], N^2 = [[0, 0, 3], 0, 0]:
    // exp(N) = I + N + N^2/2.
    let a = real_matrix(&[&[0.0, 1.0, 2.0], &[0.0, 0.0, 3.0], &[0.0, 0.0, 0.0]]);
    let e = exp(&a, 64).unwrap();
    assert!(e.contains_rationals(&[
        vec![q(1, 1), q(1, 1), q(7, 2)],
        vec![q(0, 1), q(1, 1), q(3, 1)],
        vec![q(0, 1), q(0, 1), q(1, 1)],
    ]));
    for (i, j) in [(1, 0), (2, 0), (2, 1)] {
        assert_eq!(e[(i, j)], RealBall::zero());
    }
}

// ---------------------------------------------------------------------------
// Precision monotonicity
// ---------------------------------------------------------------------------

#[test]
fn higher_precision_refines() {
    let a = real_matrix(&[&[0.3, -1.1, 2.0], &[0.7, 0.0, -0.4], &[1.5, 0.25, -2.5]]);
    for p in [16, 53, 128] {
        let lo = exp(&a, p).unwrap();
        let hi = exp(&a, p + 100).unwrap();
        assert!(lo.overlaps(&hi), "p = {p}");
        for (x, y) in lo.entries().iter().zip(hi.entries()) {
            assert!(y.rad() <= x.rad());
        }
    }
}

// ---------------------------------------------------------------------------
// Identity, scalar and diagonal reductions
// ---------------------------------------------------------------------------

#[test]
fn zero_matrix_gives_exact_identity() {
    for n in 0..=5 {
        assert_eq!(exp(&RealMatrix::zeros(n, n), 64).unwrap(), RealMatrix::identity(n));
        assert_eq!(
            exp(&ComplexMatrix::zeros(n, n), 64).unwrap(),
            ComplexMatrix::identity(n)
        );
    }
}

#[test]
fn one_by_one_is_scalar_exponential() {
    for x in [ball(0.5, 1e-6), RealBall::from_i64(-3), RealBall::from_f64(17.25)] {
        let a = RealMatrix::from_rows(vec![vec![x.clone()]]).unwrap();
        let out = exp_with(&a, 90, &ExpConfig::default()).unwrap();
        assert_eq!(out.plan.path, ExpPath::Scalar);
        assert_eq!(out.matrix[(0, 0)], x.exp(90));
    }
}

#[test]
fn diagonal_is_entrywise_scalar_exponential() {
    let d = [ball(1.0, 1e-10), RealBall::from_i64(-2), RealBall::from_f64(0.125)];
    let a = RealMatrix::from_fn(3, 3, |i, j| if i == j { d[i].clone() } else { RealBall::zero() });
    let e = exp(&a, 64).unwrap();
    let expected =
        RealMatrix::from_fn(3, 3, |i, j| if i == j { d[i].exp(64) } else { RealBall::zero() });
    assert_eq!(e, expected);
}

// ---------------------------------------------------------------------------
// Large norms
// ---------------------------------------------------------------------------

#[test]
fn huge_norm_forces_maximal_scaling_and_stays_sound() {
    let big = Float::one().mul_2exp(1000);
    let mut a = RealMatrix::zeros(2, 2);
    a[(0, 1)] = RealBall::exact(big.clone());
    a[(1, 0)] = RealBall::exact(big.neg());
    let out = exp_with(&a, 64, &ExpConfig::default()).unwrap();
    let wp = ExpConfig::default().working_precision(64);
    assert_eq!(out.plan.scaling, 2 * wp);
    // The exact result is a rotation, so every entry must cover [-1, 1]
    // since the rotation angle 2^1000 is not resolved at this precision.
    let unit = RealBall::new(Float::zero(), Mag::one());
    for x in out.matrix.entries() {
        assert!(x.contains(&unit), "{x}");
    }
}

#[test]
fn huge_nilpotent_keeps_exact_reference() {
    // exp([[0, 2^1000], [0, 0]]) = [[1, 2^1000], [0, 1]] exactly.
    let big = Float::one().mul_2exp(1000);
    let mut a = RealMatrix::zeros(2, 2);
    a[(0, 1)] = RealBall::exact(big);
    let out = exp_with(&a, 64, &ExpConfig::default()).unwrap();
    let wp = ExpConfig::default().working_precision(64);
    assert_eq!(out.plan.path, ExpPath::ScalingSquaring);
    assert_eq!(out.plan.scaling, 2 * wp);
    assert!(out.plan.structured);

    let two_1000 = BigRational::from_integer(BigInt::one() << 1000usize);
    assert!(out
        .matrix
        .contains_rationals(&[vec![q(1, 1), two_1000], vec![q(0, 1), q(1, 1)]]));
    assert_eq!(out.matrix[(0, 0)], RealBall::one());
    assert_eq!(out.matrix[(1, 1)], RealBall::one());
    assert_eq!(out.matrix[(1, 0)], RealBall::zero());
}

#[test]
fn large_but_moderate_norm_is_accurate() {
    // exp([[0, 40], [-40, 0]]) is a rotation by 40 radians.
    let a = real_matrix(&[&[0.0, 40.0], &[-40.0, 0.0]]);
    let e = exp(&a, 128).unwrap();
    assert!((e[(0, 0)].mid().to_f64() - 40f64.cos()).abs() < 1e-12);
    assert!((e[(0, 1)].mid().to_f64() - 40f64.sin()).abs() < 1e-12);
    assert!(e[(0, 0)].rad().cmp_2exp(-90) == Ordering::Less);
}

// ---------------------------------------------------------------------------
// Aliasing
// ---------------------------------------------------------------------------

#[test]
fn in_place_matches_separate_output() {
    let a = real_matrix(&[&[1.0, -0.5, 0.0], &[0.25, 2.0, 1.0], &[0.0, 0.0, -1.0]]);
    let separate = exp(&a, 96).unwrap();
    let mut aliased = a.clone();
    exp_in_place(&mut aliased, 96).unwrap();
    assert_eq!(aliased, separate);
}

// ---------------------------------------------------------------------------
// Properties over random small integer matrices
// ---------------------------------------------------------------------------

fn small_matrix() -> impl Strategy<Value = Vec<Vec<i8>>> {
    prop::collection::vec(prop::collection::vec(-4i8..=4, 3), 3)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_precision_levels_overlap(rows in small_matrix()) {
        let a = RealMatrix::from_fn(3, 3, |i, j| RealBall::from_i64(rows[i][j].into()));
        let lo = exp(&a, 32).unwrap();
        let hi = exp(&a, 132).unwrap();
        prop_assert!(lo.is_finite());
        prop_assert!(lo.overlaps(&hi));
    }

    #[test]
    fn prop_unreachable_positions_are_exact(rows in small_matrix()) {
        let a = RealMatrix::from_fn(3, 3, |i, j| RealBall::from_i64(rows[i][j].into()));
        let s = ballexp_mat::StructureMatrix::of(&a);
        let e = exp(&a, 48).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                if !s.is_reachable(i, j) {
                    let exact = if i == j { RealBall::one() } else { RealBall::zero() };
                    prop_assert_eq!(&e[(i, j)], &exact);
                }
            }
        }
    }
}
