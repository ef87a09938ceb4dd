//! ascent — projected gradient ascent over heterogeneous parameter tensors.
//!
//! Purpose
//! -------
//! Maximize an objective `ℓ` over a variable-length set of differently
//! shaped parameter tensors, keeping each tensor inside elementwise box
//! bounds. Callers implement [`ParameterOwner`] for the structure that owns
//! the tensors and [`LogLikelihood`] for the objective, register tensors
//! with a [`BoundPolicy`], then call [`maximize_projected`].
//!
//! Key behaviors
//! -------------
//! - Fixed-step ascent `θ ← θ + α∇ℓ`, followed by a post-hoc clamp
//!   (`max` with the lower bound, then `min` with the upper bound).
//! - Gradients come from [`LogLikelihood::backward`]; objectives without it
//!   fall back to central finite differences ([`finite_diff`]).
//! - Every gradient buffer is zeroed after each update and before the
//!   first iteration.
//! - A checkpoint hook runs every `checkpoint_every` iterations, before the
//!   objective of that iteration.
//! - The objective at the start of every iteration is recorded in
//!   [`AscentOutcome::trajectory`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Termination is by iteration count only; there is no convergence test
//!   and no line search.
//! - Only registered tensors (`requires_grad`) are stepped and projected.
//! - Numerical faults are not recovered. By default NaN/±inf propagate into
//!   later iterations and the trajectory; with
//!   [`AscentOptions::halt_on_non_finite`] the run aborts with the
//!   iteration and tensor that failed.
//!
//! Conventions
//! -----------
//! - The objective is maximized directly; no sign flips.
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult);
//!   nothing here panics on user input.
//! - Progress goes through a caller-supplied `slog::Logger`: one `info!`
//!   record per checkpoint, per-iteration records when `verbose`, and
//!   `debug!` summaries at start and end.
//!
//! Downstream usage
//! ----------------
//! - `model::objective::PriorObjective` implements [`LogLikelihood`] for
//!   `CharacterType` with analytic gradients.
//! - The `bpl-optimize-type` binary passes a terminal logger and a
//!   checkpoint closure that renders sample images.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`tensor`] cover bounds and projection, [`run`] covers
//!   the loop contract (cadence, gradient reset, fault handling), and
//!   [`finite_diff`] covers the FD fallback and gradient checker.

pub mod api;
pub mod finite_diff;
pub mod policy;
pub mod run;
pub mod tensor;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{maximize_projected, maximize_projected_with};
pub use self::policy::BoundPolicy;
pub use self::tensor::{Bound, BoxBounds, ParamTensor, TensorKind};
pub use self::traits::{AscentOptions, AscentOutcome, Checkpoint, LogLikelihood, ParameterOwner};
pub use self::types::{
    DEFAULT_CHECKPOINT_EVERY, DEFAULT_MAX_ITER, DEFAULT_SCALE_FLOOR, DEFAULT_STEP_SIZE, Grad,
    Tensor, Theta,
};

pub mod prelude {
    pub use super::api::{maximize_projected, maximize_projected_with};
    pub use super::policy::BoundPolicy;
    pub use super::tensor::{BoxBounds, ParamTensor, TensorKind};
    pub use super::traits::{AscentOptions, AscentOutcome, LogLikelihood, ParameterOwner};
}
