//! Integration tests for the sample → optimize → render pipeline.
//!
//! Purpose
//! -------
//! - Validate the full refinement of a character type: sampling from a
//!   synthetic library, registering tensors with the canonical bounds,
//!   projected gradient ascent on the prior, and token rendering at
//!   checkpoints.
//! - Check the image likelihood end to end: samples scored under the same
//!   token average to the negative entropy of its probability image.
//!
//! Coverage
//! --------
//! - `library`: synthetic construction and JSON save/load.
//! - `model::type_dist`: structural sampling, scoring, gradients.
//! - `model::token_dist` / `model::image_dist`: token and image sampling,
//!   exact scoring.
//! - `optimization::ascent`: bounds, checkpoint cadence, trajectory.
//!
//! Exclusions
//! ----------
//! - Renderer internals and prior densities in isolation; those are covered
//!   by unit tests.
use bpl_rs::{
    library::Library,
    model::{
        character::{CharacterType, StrokePart},
        errors::ModelError,
        image_dist::{ImageDistribution, neg_entropy, score_variance},
        objective::PriorObjective,
        relations::Relation,
        token_dist::TokenSampler,
        type_dist::TypeDistribution,
    },
    optimization::{
        ascent::{
            AscentOptions, BoundPolicy, LogLikelihood, ParameterOwner,
            finite_diff::max_gradient_error, maximize_projected, maximize_projected_with,
        },
        errors::OptResult,
    },
};
use rand::{SeedableRng, rngs::StdRng};
use slog::{Discard, Logger, o};

const LIB_SEED: u64 = 2024;
const N_PRIMITIVES: usize = 12;

fn library() -> Library {
    Library::synthetic(N_PRIMITIVES, LIB_SEED).unwrap()
}

/// Two strokes with primitive ids `[3, 7]` and `[1]`, the second attached to
/// the first by a sampled relation.
fn two_stroke_type(dist: &TypeDistribution<'_>, rng: &mut StdRng) -> CharacterType {
    let first = dist.sample_stroke(vec![3, 7], rng).unwrap();
    let second = dist.sample_stroke(vec![1], rng).unwrap();
    let relation = dist.sample_relation(1, &[2], rng).unwrap();
    CharacterType::new(vec![
        StrokePart { params: first, relation: Relation::Independent { gpos: [40.0, 40.0] } },
        StrokePart { params: second, relation },
    ])
    .unwrap()
}

#[test]
// Purpose
// -------
// End-to-end refinement of a fixed two-stroke type.
//
// Given
// -----
// - Synthetic library, ids [3, 7] and [1], default bound policy.
// - 1000 iterations at α = 1e-3, checkpoint every 100 iterations that
//   samples two token images.
//
// Expect
// ------
// - Trajectory of length 1000, all finite, last > first.
// - Checkpoints at 0, 100, …, 900, each with two images of render size.
// - Every inverse scale at or above 1e-4 and all gradient buffers zero.
fn fixed_two_stroke_type_improves_over_1000_iterations() {
    // Arrange
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut rng = StdRng::seed_from_u64(7);
    let mut ctype = two_stroke_type(&dist, &mut rng);
    assert_eq!(BoundPolicy::default().register(&mut ctype).unwrap(), 4);
    let opts = AscentOptions::new(1000, 1e-3, 100, false, false).unwrap();
    let sampler = TokenSampler::default();
    let mut seen = Vec::new();
    let mut checkpoint = |iteration: usize, ctype: &CharacterType| -> OptResult<()> {
        let (_, a) = sampler.sample_image(ctype, &mut rng)?;
        let (_, b) = sampler.sample_image(ctype, &mut rng)?;
        assert_eq!((a.dim(), b.dim()), ((105, 105), (105, 105)));
        seen.push(iteration);
        Ok(())
    };
    let logger = Logger::root(Discard, o!());

    // Act
    let objective = PriorObjective::new(dist);
    let outcome =
        maximize_projected_with(&objective, &mut ctype, &opts, &mut checkpoint, &logger).unwrap();

    // Assert
    assert_eq!(outcome.trajectory.len(), 1000);
    assert!(outcome.trajectory.iter().all(|v| v.is_finite()));
    assert!(outcome.last().unwrap() > outcome.first().unwrap());
    assert_eq!(seen, (0..1000).step_by(100).collect::<Vec<_>>());
    for part in ctype.parts() {
        assert!(part.params.invscales().value().iter().all(|&x| x >= 1e-4));
    }
    assert_eq!(ctype.grad_norm(), 0.0);
}

#[test]
// Purpose
// -------
// Structural sampling honours a fixed stroke count and rejects zero.
//
// Given
// -----
// - `sample_type(Some(k))` for k = 1..=5, and `Some(0)`.
//
// Expect
// ------
// - Exactly `k` strokes with consistent per-stroke cardinalities; an
//   `InvalidStrokeCount` error for zero.
fn sampled_types_have_requested_structure() {
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut rng = StdRng::seed_from_u64(11);

    for k in 1..=5 {
        let ctype = dist.sample_type(Some(k), &mut rng).unwrap();
        assert_eq!(ctype.n_strokes(), k);
        for (i, part) in ctype.parts().iter().enumerate() {
            let nsub = part.params.nsub();
            assert!(nsub >= 1);
            assert_eq!(part.params.shapes().shape()[0], nsub);
            assert_eq!(part.params.invscales().len(), nsub);
            assert!(part.relation.attach().is_none_or(|a| a < i));
        }
    }
    assert_eq!(
        dist.sample_type(Some(0), &mut rng).unwrap_err(),
        ModelError::InvalidStrokeCount { count: 0 }
    );
}

#[test]
// Purpose
// -------
// No gradient survives from one iteration into the next on a full type.
//
// Given
// -----
// - The fixed two-stroke type, 30 iterations, a checkpoint on every
//   iteration that records the registered gradient norm.
//
// Expect
// ------
// - 30 recorded norms, all exactly zero.
fn gradients_are_reset_every_iteration() {
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut ctype = two_stroke_type(&dist, &mut StdRng::seed_from_u64(13));
    BoundPolicy::default().register(&mut ctype).unwrap();
    let opts = AscentOptions::new(30, 1e-3, 1, false, false).unwrap();
    let mut norms = Vec::new();
    let mut record = |_: usize, ctype: &CharacterType| -> OptResult<()> {
        norms.push(ctype.grad_norm());
        Ok(())
    };
    let logger = Logger::root(Discard, o!());

    maximize_projected_with(&PriorObjective::new(dist), &mut ctype, &opts, &mut record, &logger)
        .unwrap();

    assert_eq!(norms.len(), 30);
    assert!(norms.iter().all(|&n| n == 0.0));
}

/// ℓ = −1000 · Σ invscales; pushes every scale towards the floor.
struct ShrinkScales;

impl LogLikelihood<CharacterType> for ShrinkScales {
    fn value(&self, ctype: &CharacterType) -> OptResult<f64> {
        let scales = ctype.parts().iter().flat_map(|p| p.params.invscales().value().iter());
        Ok(-1000.0 * scales.sum::<f64>())
    }

    fn backward(&self, ctype: &mut CharacterType) -> OptResult<()> {
        for stroke in ctype.params_mut() {
            let g = stroke.invscales().value().mapv(|_| -1000.0);
            stroke.invscales_mut().accumulate_grad(g.view())?;
        }
        Ok(())
    }
}

#[test]
// Purpose
// -------
// The canonical lower bound clamps inverse scales exactly to 1e-4.
//
// Given
// -----
// - Every inverse scale set to 2e-4, objective with gradient −1000 per
//   scale, one step at α = 1e-3.
//
// Expect
// ------
// - Every inverse scale equals 1e-4 exactly; shapes are unchanged.
fn inverse_scales_are_clamped_to_the_floor() {
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut ctype = two_stroke_type(&dist, &mut StdRng::seed_from_u64(3));
    for stroke in ctype.params_mut() {
        stroke.invscales_mut().value_mut().fill(2e-4);
    }
    BoundPolicy::default().register(&mut ctype).unwrap();
    let shapes_before: Vec<_> =
        ctype.parts().iter().map(|p| p.params.shapes().value().clone()).collect();
    let opts = AscentOptions { max_iter: 1, ..AscentOptions::default() };

    maximize_projected(&ShrinkScales, &mut ctype, &opts).unwrap();

    for (part, before) in ctype.parts().iter().zip(&shapes_before) {
        assert!(part.params.invscales().value().iter().all(|&x| x == 1e-4));
        assert_eq!(part.params.shapes().value(), before);
    }
}

#[test]
// Purpose
// -------
// Samples scored under their own token average to the negative entropy.
//
// Given
// -----
// - One token of a sampled 2-stroke type; 1000 images drawn and scored
//   through `ImageDistribution`.
//
// Expect
// ------
// - |mean score − neg_entropy| < 5 · sd / √n with sd from the exact score
//   variance.
fn image_scores_match_negative_entropy() {
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut rng = StdRng::seed_from_u64(19);
    let ctype = dist.sample_type(Some(2), &mut rng).unwrap();
    let sampler = TokenSampler::default();
    let token = sampler.sample_token(&ctype, &mut rng).unwrap();
    let image_dist = sampler.image_dist();
    let pimg = image_dist.probability_image(&token).unwrap();
    let n = 1000;

    let mut total = 0.0;
    for _ in 0..n {
        let image = image_dist.sample_image(&token, &mut rng).unwrap();
        total += image_dist.score_image(&token, &image).unwrap();
    }

    let mean = total / n as f64;
    let tol = 5.0 * score_variance(&pimg).sqrt() / (n as f64).sqrt();
    let expected = neg_entropy(&pimg);
    assert!((mean - expected).abs() < tol, "mean {mean}, expected {expected}");
}

#[test]
// Purpose
// -------
// Scoring has no side effects.
//
// Given
// -----
// - A type, a token and an image; prior and image scores computed twice.
//
// Expect
// ------
// - Bit-identical scores; type and token unchanged.
fn scoring_is_repeatable_and_side_effect_free() {
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut rng = StdRng::seed_from_u64(23);
    let ctype = dist.sample_type(Some(3), &mut rng).unwrap();
    let sampler = TokenSampler::default();
    let (token, image) = sampler.sample_image(&ctype, &mut rng).unwrap();
    let (ctype_before, token_before) = (ctype.clone(), token.clone());
    let objective = PriorObjective::new(dist);

    let prior = [objective.value(&ctype).unwrap(), objective.value(&ctype).unwrap()];
    let score = [
        sampler.image_dist().score_image(&token, &image).unwrap(),
        sampler.image_dist().score_image(&token, &image).unwrap(),
    ];

    assert_eq!(prior[0].to_bits(), prior[1].to_bits());
    assert_eq!(score[0].to_bits(), score[1].to_bits());
    assert_eq!(ctype, ctype_before);
    assert_eq!(token, token_before);
}

#[test]
// Purpose
// -------
// The analytic backward pass over a full type matches finite differences.
//
// Given
// -----
// - The fixed two-stroke type registered with the default policy.
//
// Expect
// ------
// - Largest absolute deviation below 1e-3.
fn analytic_gradient_matches_finite_differences() {
    let lib = library();
    let dist = TypeDistribution::new(&lib);
    let mut ctype = two_stroke_type(&dist, &mut StdRng::seed_from_u64(31));
    BoundPolicy::default().register(&mut ctype).unwrap();

    let err = max_gradient_error(&PriorObjective::new(dist), &ctype).unwrap();

    assert!(err < 1e-3, "max gradient error {err}");
}

#[test]
// Purpose
// -------
// A saved library reproduces the same types after loading.
//
// Given
// -----
// - The synthetic library saved to a temporary directory and loaded back.
//
// Expect
// ------
// - Types sampled with the same seed from both libraries are identical up
//   to the exp/ln round trip of the start probabilities (same structure,
//   same continuous values).
fn library_round_trip_preserves_sampling() {
    let lib = library();
    let dir = tempfile::tempdir().unwrap();
    lib.save(dir.path()).unwrap();
    let loaded = Library::load(dir.path()).unwrap();

    let sample = |lib: &Library| {
        TypeDistribution::new(lib).sample_type(Some(2), &mut StdRng::seed_from_u64(5)).unwrap()
    };
    let (a, b) = (sample(&lib), sample(&loaded));

    assert_eq!(a.n_strokes(), b.n_strokes());
    for (pa, pb) in a.parts().iter().zip(b.parts()) {
        assert_eq!(pa.params.ids(), pb.params.ids());
        assert_eq!(pa.params.shapes().value(), pb.params.shapes().value());
    }
}
