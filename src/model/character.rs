//! Character types and tokens.
//!
//! A [`CharacterType`] is the ordered list of strokes with their relations;
//! it owns every continuous parameter and exposes them to the optimizer via
//! [`ParameterOwner`]. A [`CharacterToken`] is a renderable snapshot: motor
//! trajectories already placed on the canvas plus the token-level affine,
//! noise and blur.
use crate::{
    model::{
        errors::{ModelError, ModelResult},
        params::StrokeParams,
        relations::Relation,
    },
    optimization::ascent::{ParamTensor, ParameterOwner},
    rendering::{Motor, bspline},
};
use ndarray::{Array1, Array2, Array3, Axis};

/// One stroke and the relation that places it.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePart {
    pub params: StrokeParams,
    pub relation: Relation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterType {
    parts: Vec<StrokePart>,
}

impl CharacterType {
    /// # Errors
    /// - [`ModelError::InvalidStrokeCount`] for an empty list.
    /// - [`ModelError::EmptyStroke`] if some stroke has no sub-strokes.
    /// - [`ModelError::InvalidAttachment`] if the first stroke is not
    ///   independent or a relation refers forward.
    /// - [`ModelError::InvalidSubStroke`] for `Mid` relations naming a
    ///   missing sub-stroke.
    /// - [`ModelError::ShapeDimMismatch`] if strokes disagree on `ncpt`.
    pub fn new(parts: Vec<StrokePart>) -> ModelResult<Self> {
        if parts.is_empty() {
            return Err(ModelError::InvalidStrokeCount { count: 0 });
        }
        let ncpt = parts[0].params.ncpt();
        let mut nsubs = Vec::with_capacity(parts.len());
        for (stroke, part) in parts.iter().enumerate() {
            if part.params.nsub() == 0 {
                return Err(ModelError::EmptyStroke { stroke });
            }
            if part.params.ncpt() != ncpt {
                return Err(ModelError::ShapeDimMismatch {
                    expected: vec![part.params.nsub(), ncpt, 2],
                    found: part.params.shapes().shape().to_vec(),
                });
            }
            if let (0, Some(attach)) = (stroke, part.relation.attach()) {
                return Err(ModelError::InvalidAttachment { stroke, attach });
            }
            part.relation.validate(stroke, &nsubs)?;
            nsubs.push(part.params.nsub());
        }
        Ok(Self { parts })
    }

    pub fn n_strokes(&self) -> usize {
        self.parts.len()
    }

    pub fn parts(&self) -> &[StrokePart] {
        &self.parts
    }

    /// Mutable stroke parameters; relations stay fixed.
    pub fn params_mut(&mut self) -> impl Iterator<Item = &mut StrokeParams> {
        self.parts.iter_mut().map(|p| &mut p.params)
    }
}

impl ParameterOwner for CharacterType {
    fn tensors(&self) -> Vec<&ParamTensor> {
        let mut out = Vec::with_capacity(self.parts.len() * 3);
        for part in &self.parts {
            out.push(part.params.shapes());
            out.push(part.params.invscales());
            out.extend(part.relation.eval_spot());
        }
        out
    }

    fn tensors_mut(&mut self) -> Vec<&mut ParamTensor> {
        let mut out = Vec::with_capacity(self.parts.len() * 3);
        for part in &mut self.parts {
            let StrokePart { params, relation } = part;
            let (shapes, invscales) = params.tensors_mut();
            out.push(shapes);
            out.push(invscales);
            out.extend(relation.eval_spot_mut());
        }
        out
    }
}

/// Renderable snapshot of a character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterToken {
    /// Trajectories in pixel coordinates, before the affine warp.
    pub motor: Motor,
    /// `[x_scale, y_scale, x_shift, y_shift]`.
    pub affine: [f64; 4],
    /// Pixel-flip noise.
    pub epsilon: f64,
    /// Blur width in pixels.
    pub blur_sigma: f64,
}

/// Continuous values of one stroke for a single draw (type or token).
#[derive(Debug, Clone)]
pub(crate) struct StrokeDraw {
    pub(crate) shapes: Array3<f64>,
    pub(crate) invscales: Array1<f64>,
    /// Added to the relation position.
    pub(crate) offset: [f64; 2],
}

// ---- Helper methods ----

/// Pixel-space control points, `stroke → sub-stroke → ncpt × 2`.
///
/// Sub-stroke `j` is `(cpts − cpts[0]) · invscale[j]` translated to the end
/// of sub-stroke `j − 1`; the first sub-stroke starts at the relation
/// position plus the draw's offset.
pub(crate) fn motor_control_points(
    parts: &[StrokePart], draws: &[StrokeDraw],
) -> ModelResult<Vec<Vec<Array2<f64>>>> {
    let mut placed: Vec<Vec<Array2<f64>>> = Vec::with_capacity(parts.len());
    for (part, draw) in parts.iter().zip(draws) {
        let anchor = part.relation.position(&placed)?;
        let mut start = [anchor[0] + draw.offset[0], anchor[1] + draw.offset[1]];
        let mut subs = Vec::with_capacity(draw.invscales.len());
        for (block, &invscale) in draw.shapes.axis_iter(Axis(0)).zip(draw.invscales.iter()) {
            let origin = block.row(0).to_owned();
            let mut cpts = Array2::zeros(block.raw_dim());
            for (mut out, row) in cpts.rows_mut().into_iter().zip(block.rows()) {
                out[0] = (row[0] - origin[0]) * invscale + start[0];
                out[1] = (row[1] - origin[1]) * invscale + start[1];
            }
            let last = cpts.nrows() - 1;
            start = [cpts[[last, 0]], cpts[[last, 1]]];
            subs.push(cpts);
        }
        placed.push(subs);
    }
    Ok(placed)
}

/// Sample every sub-stroke spline at `spline_samples` points.
pub(crate) fn sample_motor(cpts: &[Vec<Array2<f64>>], spline_samples: usize) -> ModelResult<Motor> {
    cpts.iter()
        .map(|stroke| {
            stroke
                .iter()
                .map(|c| bspline::sample_curve(c.view(), spline_samples).map_err(ModelError::from))
                .collect::<ModelResult<Vec<_>>>()
        })
        .collect()
}
