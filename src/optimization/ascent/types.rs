//! ascent::types — shared numeric aliases and canonical constants.
//!
//! Purpose
//! -------
//! Centralize the array aliases used by the projected-ascent optimizer and
//! the constants that reproduce the canonical run configuration, so the
//! rest of the optimizer and the model layer agree on one vocabulary.
//!
//! Conventions
//! -----------
//! - [`Tensor`] is the storage type of every optimizable parameter; its
//!   shape is fixed at construction.
//! - [`Theta`] / [`Grad`] are flat views over all *registered* tensors,
//!   concatenated in owner order, each tensor flattened row-major. They
//!   are only materialized for finite differences and diagnostics.
//!
//! Testing notes
//! -------------
//! - Aliases and constants only; exercised by the surrounding modules.
use ndarray::{Array1, ArrayD};

/// N-dimensional parameter or gradient storage.
pub type Tensor = ArrayD<f64>;

/// Flattened vector of registered parameter values.
pub type Theta = Array1<f64>;

/// Flattened gradient `∇ℓ` matching [`Theta`].
pub type Grad = Array1<f64>;

/// Default learning rate `α`.
pub const DEFAULT_STEP_SIZE: f64 = 1e-3;

/// Default iteration budget.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Default checkpoint cadence (iterations).
pub const DEFAULT_CHECKPOINT_EVERY: usize = 100;

/// Default lower bound for inverse scales.
pub const DEFAULT_SCALE_FLOOR: f64 = 1e-4;
