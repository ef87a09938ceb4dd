//! ascent::tensor — optimizable parameter tensors with box bounds.
//!
//! Purpose
//! -------
//! Give every continuous model parameter a uniform, optimizer-facing
//! representation: an owned value array, a same-shaped gradient
//! accumulator, a registration flag and optional elementwise box bounds.
//! The optimizer only ever manipulates [`ParamTensor`]s, never stroke or
//! relation structure.
//!
//! Key behaviors
//! -------------
//! - Gradients *accumulate* (`grad += g`) until explicitly zeroed, so one
//!   backward pass may add contributions from several terms.
//! - [`ParamTensor::ascent_step`] applies `value += α · grad`.
//! - [`ParamTensor::project`] clamps elementwise: `max(value, lower)`
//!   followed by `min(value, upper)`. This is a post-hoc clamp, not a
//!   proper projection onto a general convex set.
//!
//! Invariants & assumptions
//! ------------------------
//! - `grad.shape() == value.shape()` at all times.
//! - Tensor-valued bounds have the exact shape of the value; scalar bounds
//!   broadcast. Bounds never contain NaN and `lower <= upper` elementwise.
//! - A NaN parameter stays NaN through projection (comparisons with NaN
//!   are false), so numerical faults remain visible downstream.
//!
//! Conventions
//! -----------
//! - Unregistered tensors (`requires_grad == false`) silently ignore
//!   gradient contributions and are skipped by the optimizer.
use crate::optimization::{
    ascent::types::Tensor,
    errors::{OptError, OptResult},
};
use ndarray::{ArrayViewD, ArrayViewMutD, Zip};

/// Role of a parameter tensor inside a character type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorKind {
    /// Spline control points of a stroke, `[nsub, ncpt, 2]`.
    Shape,
    /// Per-sub-stroke inverse scales, `[nsub]`.
    InvScale,
    /// Attachment location of a `Mid` relation, `[1]`.
    EvalSpot,
}

impl TensorKind {
    pub fn name(&self) -> &'static str {
        match self {
            TensorKind::Shape => "shapes",
            TensorKind::InvScale => "invscales",
            TensorKind::EvalSpot => "eval_spot",
        }
    }
}

/// One side of a box constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Applied to every element.
    Scalar(f64),
    /// Elementwise; must match the value shape.
    Tensor(Tensor),
}

/// Optional lower and upper bounds for a tensor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxBounds {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl BoxBounds {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn lower(lb: f64) -> Self {
        Self { lower: Some(Bound::Scalar(lb)), upper: None }
    }

    pub fn upper(ub: f64) -> Self {
        Self { lower: None, upper: Some(Bound::Scalar(ub)) }
    }

    pub fn between(lb: f64, ub: f64) -> Self {
        Self { lower: Some(Bound::Scalar(lb)), upper: Some(Bound::Scalar(ub)) }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamTensor {
    kind: TensorKind,
    value: Tensor,
    grad: Tensor,
    requires_grad: bool,
    bounds: BoxBounds,
}

impl ParamTensor {
    /// Wrap `value` as an unregistered, unbounded tensor with a zero gradient.
    pub fn new(kind: TensorKind, value: Tensor) -> Self {
        let grad = Tensor::zeros(value.raw_dim());
        Self { kind, value, grad, requires_grad: false, bounds: BoxBounds::unbounded() }
    }

    pub fn kind(&self) -> TensorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    /// Mutable view of the values; the shape is fixed at construction.
    pub fn value_mut(&mut self) -> ArrayViewMutD<'_, f64> {
        self.value.view_mut()
    }

    pub fn grad(&self) -> &Tensor {
        &self.grad
    }

    pub fn shape(&self) -> &[usize] {
        self.value.shape()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn set_requires_grad(&mut self, on: bool) {
        self.requires_grad = on;
    }

    pub fn bounds(&self) -> &BoxBounds {
        &self.bounds
    }

    /// Replace the box bounds after validating them against this tensor.
    ///
    /// # Errors
    /// - [`OptError::InvalidBound`] if any bound entry is NaN.
    /// - [`OptError::BoundShapeMismatch`] if a tensor bound has the wrong shape.
    /// - [`OptError::EmptyBox`] if `lower > upper` for some element.
    pub fn set_bounds(&mut self, bounds: BoxBounds) -> OptResult<()> {
        let name = self.name();
        for bound in [&bounds.lower, &bounds.upper].into_iter().flatten() {
            match bound {
                Bound::Scalar(v) => check_bound_value(name, *v)?,
                Bound::Tensor(t) => {
                    if t.shape() != self.value.shape() {
                        return Err(OptError::BoundShapeMismatch {
                            tensor: name,
                            expected: self.value.shape().to_vec(),
                            found: t.shape().to_vec(),
                        });
                    }
                    for &v in t.iter() {
                        check_bound_value(name, v)?;
                    }
                }
            }
        }
        if let (Some(lower), Some(upper)) = (&bounds.lower, &bounds.upper) {
            for index in 0..self.value.len() {
                let (l, u) = (bound_at(lower, index), bound_at(upper, index));
                if l > u {
                    return Err(OptError::EmptyBox { tensor: name, index, lower: l, upper: u });
                }
            }
        }
        self.bounds = bounds;
        Ok(())
    }

    /// Add `g` into the gradient buffer. No-op for unregistered tensors.
    ///
    /// # Errors
    /// [`OptError::GradientDimMismatch`] if `g` does not match the value shape.
    pub fn accumulate_grad(&mut self, g: ArrayViewD<'_, f64>) -> OptResult<()> {
        if g.shape() != self.value.shape() {
            return Err(OptError::GradientDimMismatch {
                tensor: self.name(),
                expected: self.value.shape().to_vec(),
                found: g.shape().to_vec(),
            });
        }
        if self.requires_grad {
            self.grad += &g;
        }
        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// `value += step · grad`.
    pub fn ascent_step(&mut self, step: f64) {
        self.value.scaled_add(step, &self.grad);
    }

    /// Clamp the value into the box: lower bound first, then upper bound.
    pub fn project(&mut self) {
        if let Some(lower) = &self.bounds.lower {
            match lower {
                Bound::Scalar(l) => self.value.map_inplace(|v| {
                    if *v < *l {
                        *v = *l
                    }
                }),
                Bound::Tensor(l) => Zip::from(&mut self.value).and(l).for_each(|v, &l| {
                    if *v < l {
                        *v = l
                    }
                }),
            }
        }
        if let Some(upper) = &self.bounds.upper {
            match upper {
                Bound::Scalar(u) => self.value.map_inplace(|v| {
                    if *v > *u {
                        *v = *u
                    }
                }),
                Bound::Tensor(u) => Zip::from(&mut self.value).and(u).for_each(|v, &u| {
                    if *v > u {
                        *v = u
                    }
                }),
            }
        }
    }
}

// ---- Helper methods ----

fn check_bound_value(tensor: &'static str, value: f64) -> OptResult<()> {
    if value.is_nan() {
        return Err(OptError::InvalidBound { tensor, value, reason: "Bounds must not be NaN." });
    }
    Ok(())
}

fn bound_at(bound: &Bound, index: usize) -> f64 {
    match bound {
        Bound::Scalar(v) => *v,
        Bound::Tensor(t) => t.iter().nth(index).copied().unwrap_or(f64::NAN),
    }
}
