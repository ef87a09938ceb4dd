//! optimization — projected-ascent optimizer, numerical helpers, and error surface.
//!
//! Purpose
//! -------
//! Provide the constrained optimization layer used to refine character
//! types: a projected gradient-ascent loop over registered parameter
//! tensors (`ascent`), guarded log-probability helpers
//! (`numerical_stability`), and a single error/result surface (`errors`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives treat invalid inputs as recoverable `OptError`s, not panics.
//! - Model-layer errors raised while scoring are wrapped as
//!   `OptError::Model`, so callers see one error type per optimizer call.
//!
//! Conventions
//! -----------
//! - Parameters live in `ndarray` containers over `f64` (`Tensor`, `Theta`).
//! - This module performs no I/O; logging goes through the `slog::Logger`
//!   handed to the optimizer.
//!
//! Downstream usage
//! ----------------
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.

pub mod ascent;
pub mod errors;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use bpl_rs::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::ascent::prelude::*;
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
}
