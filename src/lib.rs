//! bpl_rs — character-type prior refinement by projected gradient ascent.
//!
//! Purpose
//! -------
//! Serve as the crate root for sampling hierarchical character types
//! (strokes, sub-strokes, inter-stroke relations) from a learned primitive
//! library, refining their continuous parameters by projected gradient
//! ascent on the prior log-probability, and rendering stochastic binary
//! image tokens under a Bernoulli pixel likelihood.
//!
//! Key behaviors
//! -------------
//! - [`library`]: learned per-primitive statistics, loaded from
//!   `library.json` or built synthetically from a seed.
//! - [`model`]: type sampling and differentiable scoring, token sampling,
//!   image sampling and exact image scoring.
//! - [`optimization`]: the projected-ascent engine over owners of
//!   heterogeneously shaped parameter tensors, with per-tensor box bounds.
//! - [`rendering`]: the deterministic motor-program → probability-image
//!   renderer.
//!
//! Invariants & assumptions
//! ------------------------
//! - The library is read-only once loaded; types borrow it through
//!   `TypeDistribution`.
//! - The optimizer is the only writer of a type's continuous values during a
//!   run; tokens are snapshots.
//! - No I/O happens in the library code except library loading/saving;
//!   logging goes through a caller-supplied `slog::Logger`.
//!
//! Conventions
//! -----------
//! - Every layer has its own error enum (`LibraryError`, `ModelError`,
//!   `RenderError`, `OptError`) with `From` conversions toward the
//!   optimizer.
//! - Indices (strokes, sub-strokes, primitives, iterations) are 0-based.
//!
//! Downstream usage
//! ----------------
//! - The `bpl-optimize-type` binary wires these modules together; library
//!   users typically start from [`prelude`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the code; `tests/integration_optimize_type.rs`
//!   runs the full sample → optimize → render pipeline on a synthetic
//!   library.
pub mod library;
pub mod model;
pub mod optimization;
pub mod rendering;

pub mod prelude {
    pub use crate::library::{Canvas, Library, errors::{LibraryError, LibraryResult}};
    pub use crate::model::prelude::*;
    pub use crate::optimization::prelude::*;
    pub use crate::rendering::{
        ProbImage, RenderConfig, apply_render,
        errors::{RenderError, RenderResult},
    };
}
