//! Type-level prior: sampling and differentiable scoring of strokes.
//!
//! Purpose
//! -------
//! Draw complete character types from a [`Library`] and score the
//! continuous stroke parameters (control points and inverse scales) under
//! the per-primitive priors, together with the analytic gradients the
//! optimizer needs.
//!
//! Key behaviors
//! -------------
//! - [`TypeDistribution::sample_type`] draws the stroke count, sub-stroke
//!   counts, primitive ids (Markov chain), shapes, inverse scales and one
//!   relation per stroke.
//! - `score_*` and `*_grad` read exactly the same per-primitive statistics,
//!   so gradients always match the scored density.
//!
//! Invariants & assumptions
//! ------------------------
//! - Scoring is pure: inputs are read only and repeated calls return
//!   bit-identical values.
//! - Sampled inverse scales are clamped up to the scale floor so a fresh
//!   type is feasible for the optimizer's lower bound.
//! - The first stroke is always `Independent`; later strokes attach only to
//!   earlier ones.
//!
//! Conventions
//! -----------
//! - `shapes` is `[nsub, ncpt, 2]`; each block is flattened row-major to
//!   match the library's `2·ncpt` mean vectors.
//! - Relation mixture order: independent, start, end, mid.
//!
//! Downstream usage
//! ----------------
//! - `model::objective::PriorObjective` sums the scores over strokes and
//!   accumulates the gradients into the type's tensors.
//!
//! Testing notes
//! -------------
//! - Unit tests cover structure of sampled types, scoring errors, purity
//!   and gradient agreement with finite differences.
use crate::{
    library::{Library, ScalePrior, ShapePrior},
    model::{
        character::{CharacterType, StrokePart},
        errors::{ModelError, ModelResult},
        params::StrokeParams,
        relations::{Relation, eval_spot_range},
    },
    optimization::ascent::DEFAULT_SCALE_FLOOR,
};
use ndarray::{Array1, Array3, ArrayView1, ArrayView3, Axis};
use rand::{
    Rng,
    distributions::{Distribution, WeightedIndex},
};

/// Prior over character types, borrowing a library.
#[derive(Debug, Clone, Copy)]
pub struct TypeDistribution<'a> {
    lib: &'a Library,
    scale_floor: f64,
}

impl<'a> TypeDistribution<'a> {
    pub fn new(lib: &'a Library) -> Self {
        Self { lib, scale_floor: DEFAULT_SCALE_FLOOR }
    }

    pub fn library(&self) -> &'a Library {
        self.lib
    }

    /// Lowest inverse scale a sampled stroke may start with.
    pub fn scale_floor(&self) -> f64 {
        self.scale_floor
    }

    // ---- Sampling ----

    /// Sample a complete character type.
    ///
    /// # Parameters
    /// - `num_strokes`: fixed stroke count, or `None` to draw it from the
    ///   library's stroke-count distribution.
    ///
    /// # Errors
    /// - [`ModelError::InvalidStrokeCount`] for `Some(0)`.
    /// - [`ModelError::Distribution`] if a library table cannot be sampled.
    pub fn sample_type<R: Rng + ?Sized>(
        &self, num_strokes: Option<usize>, rng: &mut R,
    ) -> ModelResult<CharacterType> {
        let n_strokes = match num_strokes {
            Some(0) => return Err(ModelError::InvalidStrokeCount { count: 0 }),
            Some(k) => k,
            None => self.sample_num_strokes(rng)?,
        };
        let mut parts: Vec<StrokePart> = Vec::with_capacity(n_strokes);
        for stroke in 0..n_strokes {
            let nsub = self.sample_nsub(n_strokes, rng)?;
            let ids = self.sample_ids(nsub, rng)?;
            let params = self.sample_stroke(ids, rng)?;
            let nsubs: Vec<usize> = parts.iter().map(|p| p.params.nsub()).collect();
            let relation = self.sample_relation(stroke, &nsubs, rng)?;
            parts.push(StrokePart { params, relation });
        }
        CharacterType::new(parts)
    }

    /// Stroke with the given primitive ids and prior-sampled continuous
    /// values.
    pub fn sample_stroke<R: Rng + ?Sized>(
        &self, ids: Vec<usize>, rng: &mut R,
    ) -> ModelResult<StrokeParams> {
        let shapes = self.sample_shapes_type(&ids, rng)?;
        let invscales = self.sample_invscales_type(&ids, rng)?;
        StrokeParams::new(ids, shapes, invscales)
    }

    pub fn sample_num_strokes<R: Rng + ?Sized>(&self, rng: &mut R) -> ModelResult<usize> {
        let dist = WeightedIndex::new(self.lib.stroke_count_pmf().iter())?;
        Ok(dist.sample(rng) + 1)
    }

    /// Sub-stroke count for a stroke of a character with `n_strokes` strokes.
    pub fn sample_nsub<R: Rng + ?Sized>(
        &self, n_strokes: usize, rng: &mut R,
    ) -> ModelResult<usize> {
        let dist = WeightedIndex::new(self.lib.substroke_count_row(n_strokes).iter())?;
        Ok(dist.sample(rng) + 1)
    }

    /// `nsub` primitive ids from the library's Markov chain.
    pub fn sample_ids<R: Rng + ?Sized>(&self, nsub: usize, rng: &mut R) -> ModelResult<Vec<usize>> {
        let mut ids = Vec::with_capacity(nsub);
        if nsub == 0 {
            return Ok(ids);
        }
        let start = WeightedIndex::new(self.lib.start_probs().iter())?;
        let mut current = start.sample(rng);
        ids.push(current);
        for _ in 1..nsub {
            let row = self.lib.transition_row(current).ok_or(ModelError::UnknownPrimitive {
                id: current,
                n_primitives: self.lib.n_primitives(),
            })?;
            current = WeightedIndex::new(row.iter())?.sample(rng);
            ids.push(current);
        }
        Ok(ids)
    }

    /// Control points `[nsub, ncpt, 2]` drawn from each primitive's MVN.
    pub fn sample_shapes_type<R: Rng + ?Sized>(
        &self, ids: &[usize], rng: &mut R,
    ) -> ModelResult<Array3<f64>> {
        let ncpt = self.lib.ncpt();
        let mut shapes = Array3::zeros((ids.len(), ncpt, 2));
        for (mut block, &id) in shapes.axis_iter_mut(Axis(0)).zip(ids) {
            let flat = self.shape_prior(id)?.sample(rng);
            for (dst, src) in block.iter_mut().zip(flat.iter()) {
                *dst = *src;
            }
        }
        Ok(shapes)
    }

    /// Inverse scales `[nsub]` drawn from each primitive's gamma prior and
    /// clamped up to the scale floor.
    pub fn sample_invscales_type<R: Rng + ?Sized>(
        &self, ids: &[usize], rng: &mut R,
    ) -> ModelResult<Array1<f64>> {
        ids.iter()
            .map(|&id| Ok(self.scale_prior(id)?.sample(rng).max(self.scale_floor)))
            .collect::<ModelResult<Vec<f64>>>()
            .map(Array1::from)
    }

    /// Relation of stroke `stroke` given the sub-stroke counts of the
    /// strokes before it. Stroke 0 is always independent.
    pub fn sample_relation<R: Rng + ?Sized>(
        &self, stroke: usize, previous_nsub: &[usize], rng: &mut R,
    ) -> ModelResult<Relation> {
        let kind = if stroke == 0 || previous_nsub.is_empty() {
            0
        } else {
            WeightedIndex::new(self.lib.relation_mixprobs().iter())?.sample(rng)
        };
        if kind == 0 {
            let canvas = self.lib.canvas();
            let gpos = [
                rng.gen_range(canvas.xlim[0]..canvas.xlim[1]),
                rng.gen_range(canvas.ylim[0]..canvas.ylim[1]),
            ];
            return Ok(Relation::Independent { gpos });
        }
        let attach = rng.gen_range(0..previous_nsub.len());
        Ok(match kind {
            1 => Relation::Start { attach },
            2 => Relation::End { attach },
            _ => {
                let subid = rng.gen_range(0..previous_nsub[attach]);
                let eval_spot = rng.gen_range(0.0..=eval_spot_range(self.lib.ncpt()));
                Relation::mid(attach, subid, eval_spot)
            }
        })
    }

    // ---- Scoring ----

    /// `Σⱼ ln N(vec(shapes[j]); μ_{ids[j]}, Σ_{ids[j]})`.
    ///
    /// # Errors
    /// - [`ModelError::SubStrokeCountMismatch`] if `ids` and `shapes` disagree.
    /// - [`ModelError::ShapeDimMismatch`] for blocks other than `ncpt × 2`.
    /// - [`ModelError::UnknownPrimitive`] for ids outside the library.
    pub fn score_shapes_type(
        &self, ids: &[usize], shapes: ArrayView3<'_, f64>,
    ) -> ModelResult<f64> {
        self.check_shapes(ids, shapes)?;
        let mut total = 0.0;
        for (block, &id) in shapes.axis_iter(Axis(0)).zip(ids) {
            let flat = Array1::from_iter(block.iter().copied());
            total += self.shape_prior(id)?.ln_pdf(flat.view());
        }
        Ok(total)
    }

    /// `Σⱼ ln Gamma(invscales[j]; k_{ids[j]}, r_{ids[j]})`.
    pub fn score_invscales_type(
        &self, ids: &[usize], invscales: ArrayView1<'_, f64>,
    ) -> ModelResult<f64> {
        self.check_invscales(ids, invscales)?;
        let mut total = 0.0;
        for (&x, &id) in invscales.iter().zip(ids) {
            total += self.scale_prior(id)?.ln_pdf(x);
        }
        Ok(total)
    }

    /// `∂/∂shapes` of [`Self::score_shapes_type`], shaped like `shapes`.
    pub fn shapes_grad(
        &self, ids: &[usize], shapes: ArrayView3<'_, f64>,
    ) -> ModelResult<Array3<f64>> {
        self.check_shapes(ids, shapes)?;
        let mut grad = Array3::zeros(shapes.raw_dim());
        let blocks = grad.axis_iter_mut(Axis(0)).zip(shapes.axis_iter(Axis(0)));
        for ((mut g, block), &id) in blocks.zip(ids) {
            let flat = Array1::from_iter(block.iter().copied());
            let dg = self.shape_prior(id)?.grad_ln_pdf(flat.view());
            for (dst, src) in g.iter_mut().zip(dg.iter()) {
                *dst = *src;
            }
        }
        Ok(grad)
    }

    /// `∂/∂invscales` of [`Self::score_invscales_type`].
    pub fn invscales_grad(
        &self, ids: &[usize], invscales: ArrayView1<'_, f64>,
    ) -> ModelResult<Array1<f64>> {
        self.check_invscales(ids, invscales)?;
        ids.iter()
            .zip(invscales.iter())
            .map(|(&id, &x)| Ok(self.scale_prior(id)?.grad_ln_pdf(x)))
            .collect::<ModelResult<Vec<f64>>>()
            .map(Array1::from)
    }

    // ---- Helper methods ----

    fn shape_prior(&self, id: usize) -> ModelResult<&'a ShapePrior> {
        self.lib
            .shape_prior(id)
            .ok_or(ModelError::UnknownPrimitive { id, n_primitives: self.lib.n_primitives() })
    }

    fn scale_prior(&self, id: usize) -> ModelResult<&'a ScalePrior> {
        self.lib
            .scale_prior(id)
            .ok_or(ModelError::UnknownPrimitive { id, n_primitives: self.lib.n_primitives() })
    }

    fn check_shapes(&self, ids: &[usize], shapes: ArrayView3<'_, f64>) -> ModelResult<()> {
        let (nsub, ncpt, coords) = shapes.dim();
        if nsub != ids.len() {
            return Err(ModelError::SubStrokeCountMismatch {
                ids: ids.len(),
                shapes: nsub,
                invscales: nsub,
            });
        }
        if ncpt != self.lib.ncpt() || coords != 2 {
            return Err(ModelError::ShapeDimMismatch {
                expected: vec![nsub, self.lib.ncpt(), 2],
                found: vec![nsub, ncpt, coords],
            });
        }
        Ok(())
    }

    fn check_invscales(&self, ids: &[usize], invscales: ArrayView1<'_, f64>) -> ModelResult<()> {
        if invscales.len() != ids.len() {
            return Err(ModelError::SubStrokeCountMismatch {
                ids: ids.len(),
                shapes: invscales.len(),
                invscales: invscales.len(),
            });
        }
        Ok(())
    }
}
