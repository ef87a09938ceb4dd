//! Errors raised while loading or validating a primitive library.
//!
//! Library problems are fatal at startup: a run never begins with a
//! partially valid library.

/// Result alias for library loading and validation.
pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryError {
    // ---- I/O ----
    /// Library file could not be read or written.
    Io { path: String, text: String },

    /// Library file is not valid JSON for the expected layout.
    Parse { text: String },

    // ---- Structure ----
    /// Library defines no primitives.
    EmptyLibrary,

    /// Control points per sub-stroke must be at least 2.
    InvalidControlPointCount { ncpt: usize },

    /// A statistics table has the wrong size.
    DimMismatch { field: &'static str, expected: usize, found: usize },

    /// A statistic is NaN/±inf.
    NonFiniteStat { field: &'static str, index: usize, value: f64 },

    // ---- Distributions ----
    /// Shape covariance of a primitive is not positive definite.
    NotPositiveDefinite { primitive: usize },

    /// Gamma parameters must be finite and > 0.
    InvalidGammaParam { primitive: usize, value: f64, reason: &'static str },

    /// A probability table does not sum to one (or has negative mass).
    InvalidPmf { field: &'static str, row: usize, sum: f64 },

    /// Canvas region must be finite with min < max on both axes.
    InvalidCanvas { min: f64, max: f64 },
}

impl std::error::Error for LibraryError {}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io { path, text } => {
                write!(f, "Could not access library file '{path}': {text}")
            }
            LibraryError::Parse { text } => {
                write!(f, "Could not parse library file: {text}")
            }
            LibraryError::EmptyLibrary => {
                write!(f, "Library defines no primitives.")
            }
            LibraryError::InvalidControlPointCount { ncpt } => {
                write!(f, "Control points per sub-stroke must be >= 2; got: {ncpt}")
            }
            LibraryError::DimMismatch { field, expected, found } => {
                write!(f, "Library table '{field}' has size {found}, expected {expected}")
            }
            LibraryError::NonFiniteStat { field, index, value } => {
                write!(
                    f,
                    "Library table '{field}' has a non-finite entry at index {index}: {value}"
                )
            }
            LibraryError::NotPositiveDefinite { primitive } => {
                write!(f, "Shape covariance of primitive {primitive} is not positive definite")
            }
            LibraryError::InvalidGammaParam { primitive, value, reason } => {
                write!(
                    f,
                    "Scale prior of primitive {primitive} has invalid parameter {value}: {reason}"
                )
            }
            LibraryError::InvalidPmf { field, row, sum } => {
                write!(
                    f,
                    "Probability table '{field}' row {row} is not a distribution (sum = {sum})"
                )
            }
            LibraryError::InvalidCanvas { min, max } => {
                write!(f, "Canvas region must be finite with min < max; got [{min}, {max}]")
            }
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Parse { text: err.to_string() }
    }
}
