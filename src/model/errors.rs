//! Errors for the character model (type sampling, scoring, tokens, images).
//!
//! This module defines [`ModelError`], the single error surface for the
//! structural prior, the stroke/relation containers, the token sampler, and
//! the image likelihood.
//!
//! ## Conventions
//! - **Indices are 0-based**: stroke indices, sub-stroke indices and
//!   primitive ids all count from zero.
//! - Structural problems (stroke counts, primitive ids, cardinalities) are
//!   reported at construction or sampling time and are never recovered.
//! - Library and rendering failures are wrapped rather than flattened so the
//!   original diagnostic survives.
use crate::{library::errors::LibraryError, rendering::errors::RenderError};

/// Result alias for model operations that may produce [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;

/// Unified error type for the character model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Structure ----
    /// Requested stroke count must be strictly positive.
    InvalidStrokeCount { count: usize },

    /// A stroke must contain at least one sub-stroke.
    EmptyStroke { stroke: usize },

    /// Primitive id is not present in the library.
    UnknownPrimitive { id: usize, n_primitives: usize },

    /// Ids, shapes and inverse scales disagree on the sub-stroke count.
    SubStrokeCountMismatch { ids: usize, shapes: usize, invscales: usize },

    /// Control-point tensor has the wrong shape.
    ShapeDimMismatch { expected: Vec<usize>, found: Vec<usize> },

    /// A relation refers to a stroke that is not drawn before it.
    InvalidAttachment { stroke: usize, attach: usize },

    /// A mid-stroke relation refers to a missing sub-stroke.
    InvalidSubStroke { stroke: usize, attach: usize, subid: usize, nsub: usize },

    // ---- Images ----
    /// Observed image size differs from the rendered probability image.
    ImageDimMismatch { expected: (usize, usize), found: (usize, usize) },

    // ---- Sampling ----
    /// Invalid token-level configuration value.
    InvalidTokenParam { name: &'static str, value: f64, reason: &'static str },

    /// Wrapper for `rand_distr`/`statrs` construction failures.
    Distribution { text: String },

    // ---- Wrapped ----
    Library(LibraryError),
    Render(RenderError),
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Structure ----
            ModelError::InvalidStrokeCount { count } => {
                write!(f, "Number of strokes must be > 0; got: {count}")
            }
            ModelError::EmptyStroke { stroke } => {
                write!(f, "Stroke {stroke} has no sub-strokes.")
            }
            ModelError::UnknownPrimitive { id, n_primitives } => {
                write!(
                    f,
                    "Primitive id {id} is out of range for a library of {n_primitives} primitives"
                )
            }
            ModelError::SubStrokeCountMismatch { ids, shapes, invscales } => {
                write!(
                    f,
                    "Sub-stroke count mismatch: {ids} ids, {shapes} shape blocks, \
                     {invscales} inverse scales"
                )
            }
            ModelError::ShapeDimMismatch { expected, found } => {
                write!(
                    f,
                    "Control-point tensor shape mismatch: expected {expected:?}, found {found:?}"
                )
            }
            ModelError::InvalidAttachment { stroke, attach } => {
                write!(
                    f,
                    "Relation of stroke {stroke} attaches to stroke {attach}, \
                     which is not drawn before it"
                )
            }
            ModelError::InvalidSubStroke { stroke, attach, subid, nsub } => {
                write!(
                    f,
                    "Relation of stroke {stroke} refers to sub-stroke {subid} of stroke {attach}, \
                     which has {nsub} sub-strokes"
                )
            }
            // ---- Images ----
            ModelError::ImageDimMismatch { expected, found } => {
                write!(f, "Image size mismatch: expected {expected:?}, found {found:?}")
            }
            // ---- Sampling ----
            ModelError::InvalidTokenParam { name, value, reason } => {
                write!(f, "Invalid token parameter '{name}' = {value}: {reason}")
            }
            ModelError::Distribution { text } => {
                write!(f, "Distribution error: {text}")
            }
            // ---- Wrapped ----
            ModelError::Library(err) => write!(f, "Library error: {err}"),
            ModelError::Render(err) => write!(f, "Render error: {err}"),
        }
    }
}

impl From<LibraryError> for ModelError {
    fn from(err: LibraryError) -> Self {
        ModelError::Library(err)
    }
}

impl From<RenderError> for ModelError {
    fn from(err: RenderError) -> Self {
        ModelError::Render(err)
    }
}

impl From<rand_distr::NormalError> for ModelError {
    fn from(err: rand_distr::NormalError) -> Self {
        ModelError::Distribution { text: err.to_string() }
    }
}

impl From<rand::distributions::BernoulliError> for ModelError {
    fn from(err: rand::distributions::BernoulliError) -> Self {
        ModelError::Distribution { text: err.to_string() }
    }
}

impl From<rand::distributions::WeightedError> for ModelError {
    fn from(err: rand::distributions::WeightedError) -> Self {
        ModelError::Distribution { text: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Display wording and conversions from wrapped error types.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure library errors are wrapped, not flattened, when converted.
    //
    // Given
    // -----
    // - A `LibraryError::EmptyLibrary`.
    //
    // Expect
    // ------
    // - Conversion yields `ModelError::Library(EmptyLibrary)` and the message
    //   includes the inner text.
    fn library_error_is_wrapped() {
        // Arrange
        let inner = LibraryError::EmptyLibrary;

        // Act
        let err: ModelError = inner.clone().into();

        // Assert
        assert_eq!(err, ModelError::Library(inner.clone()));
        assert!(err.to_string().contains(&inner.to_string()));
    }

    #[test]
    // Purpose
    // -------
    // Check that the stroke-count error reports the offending value.
    //
    // Given
    // -----
    // - `InvalidStrokeCount { count: 0 }`.
    //
    // Expect
    // ------
    // - The message mentions `0`.
    fn invalid_stroke_count_message_mentions_value() {
        let err = ModelError::InvalidStrokeCount { count: 0 };
        assert!(err.to_string().ends_with("got: 0"));
    }
}
