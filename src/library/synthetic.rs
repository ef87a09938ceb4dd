//! Seeded synthetic library.
//!
//! Builds a small, fully valid library without external data. Each
//! primitive is a gently bent segment of random direction and length; its
//! shape covariance correlates neighbouring control points along each axis
//! and its inverse-scale prior has a mean between 15 and 25 pixels per unit,
//! which renders strokes of roughly 12 to 40 pixels.
use crate::library::{
    Canvas, Library,
    errors::{LibraryError, LibraryResult},
    file::LibraryFile,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f64::consts::PI;

const NCPT: usize = 5;
const SHAPE_VAR: f64 = 0.015;
const SHAPE_CORR: f64 = 0.5;
const STROKE_COUNT_PMF: [f64; 4] = [0.35, 0.35, 0.2, 0.1];
const SUBSTROKE_COUNT_PMF: [[f64; 3]; 2] = [[0.4, 0.35, 0.25], [0.6, 0.3, 0.1]];
const RELATION_MIXPROBS: [f64; 4] = [0.3, 0.3, 0.2, 0.2];
const CANVAS_LIM: [f64; 2] = [25.0, 80.0];

impl Library {
    /// Deterministic library of `n_primitives` primitives drawn from `seed`.
    ///
    /// # Errors
    /// [`LibraryError::EmptyLibrary`] if `n_primitives == 0`.
    pub fn synthetic(n_primitives: usize, seed: u64) -> LibraryResult<Self> {
        if n_primitives == 0 {
            return Err(LibraryError::EmptyLibrary);
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let cov = banded_cov();

        let mut shape_mean = Vec::with_capacity(n_primitives);
        let mut scale_shape = Vec::with_capacity(n_primitives);
        let mut scale_rate = Vec::with_capacity(n_primitives);
        for _ in 0..n_primitives {
            shape_mean.push(bent_segment(&mut rng));
            let k = rng.gen_range(3.0..6.0);
            let mean = rng.gen_range(15.0..25.0);
            scale_shape.push(k);
            scale_rate.push(k / mean);
        }

        let log_start = random_pmf(&mut rng, n_primitives).into_iter().map(f64::ln).collect();
        let transitions = (0..n_primitives).map(|_| random_pmf(&mut rng, n_primitives)).collect();

        Self::from_file(LibraryFile {
            ncpt: NCPT,
            shape_mean,
            shape_cov: vec![cov; n_primitives],
            scale_shape,
            scale_rate,
            log_start,
            transitions,
            stroke_count_pmf: STROKE_COUNT_PMF.to_vec(),
            substroke_count_pmf: SUBSTROKE_COUNT_PMF.iter().map(|r| r.to_vec()).collect(),
            relation_mixprobs: RELATION_MIXPROBS,
            canvas: Canvas { xlim: CANVAS_LIM, ylim: CANVAS_LIM },
        })
    }
}

// ---- Helper methods ----

/// Control points of a segment of length `L` along direction `θ`, bent
/// sideways by `b·L·sin(πt)`.
fn bent_segment<R: Rng>(rng: &mut R) -> Vec<f64> {
    let theta = rng.gen_range(0.0..2.0 * PI);
    let length = rng.gen_range(0.8..1.6);
    let bend = rng.gen_range(-0.3..0.3);
    let (dir, normal) = ([theta.cos(), theta.sin()], [-theta.sin(), theta.cos()]);
    let mut out = Vec::with_capacity(NCPT * 2);
    for k in 0..NCPT {
        let t = k as f64 / (NCPT - 1) as f64;
        let side = bend * length * (PI * t).sin();
        for c in 0..2 {
            out.push(t * length * dir[c] + side * normal[c]);
        }
    }
    out
}

/// `σ² ρ^|k−k'|` between control points `k, k'` on the same axis; zero
/// across axes.
fn banded_cov() -> Vec<Vec<f64>> {
    let d = NCPT * 2;
    (0..d)
        .map(|i| {
            (0..d)
                .map(|j| {
                    if i % 2 != j % 2 {
                        return 0.0;
                    }
                    let lag = (i / 2).abs_diff(j / 2) as i32;
                    SHAPE_VAR * SHAPE_CORR.powi(lag)
                })
                .collect()
        })
        .collect()
}

fn random_pmf<R: Rng>(rng: &mut R, n: usize) -> Vec<f64> {
    let weights: Vec<f64> = (0..n).map(|_| rng.gen_range(0.2..1.0)).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
