use crate::model::errors::ModelError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- AscentOptions ----
    /// Step size needs to be positive and finite.
    InvalidStepSize {
        step_size: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Checkpoint cadence needs to be positive.
    InvalidCheckpointEvery {
        every: usize,
        reason: &'static str,
    },

    // ---- Bounds ----
    /// Bound values must not be NaN.
    InvalidBound {
        tensor: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Tensor-shaped bounds must match the parameter tensor shape.
    BoundShapeMismatch {
        tensor: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// Lower bound exceeds upper bound for some element.
    EmptyBox {
        tensor: &'static str,
        index: usize,
        lower: f64,
        upper: f64,
    },

    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        tensor: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Finite-difference gradient element is NaN/±inf.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Flattened parameter vector does not match the registered tensors.
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Nothing was registered for optimization.
    NoRegisteredTensors,

    // ---- Numerical faults ----
    /// Objective became NaN/±inf.
    NonFiniteObjective {
        iteration: usize,
        value: f64,
    },
    /// A parameter element became NaN/±inf after the update.
    NonFiniteParameter {
        iteration: usize,
        tensor: &'static str,
        index: usize,
        value: f64,
    },

    // ---- Checkpoint ----
    /// The checkpoint hook could not report its output.
    CheckpointFailed {
        iteration: usize,
        text: String,
    },

    // ---- Model ----
    /// Wrapper for errors raised while scoring the model.
    Model(ModelError),
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- AscentOptions ----
            OptError::InvalidStepSize { step_size, reason } => {
                write!(f, "Invalid step size {step_size}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidCheckpointEvery { every, reason } => {
                write!(f, "Invalid checkpoint cadence {every}: {reason}")
            }

            // ---- Bounds ----
            OptError::InvalidBound { tensor, value, reason } => {
                write!(f, "Invalid bound {value} for tensor '{tensor}': {reason}")
            }
            OptError::BoundShapeMismatch { tensor, expected, found } => {
                write!(
                    f,
                    "Bound shape mismatch for tensor '{tensor}': \
                     expected {expected:?}, found {found:?}"
                )
            }
            OptError::EmptyBox { tensor, index, lower, upper } => {
                write!(
                    f,
                    "Empty feasible box for tensor '{tensor}' at index {index}: \
                     lower {lower} > upper {upper}"
                )
            }

            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Analytic gradient not implemented")
            }
            OptError::GradientDimMismatch { tensor, expected, found } => {
                write!(
                    f,
                    "Gradient shape mismatch for tensor '{tensor}': \
                     expected {expected:?}, found {found:?}"
                )
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}. {reason}")
            }
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Theta length mismatch: expected {expected}, actual {actual}")
            }
            OptError::NoRegisteredTensors => {
                write!(f, "No parameter tensors are registered for optimization")
            }

            // ---- Numerical faults ----
            OptError::NonFiniteObjective { iteration, value } => {
                write!(f, "Objective became non-finite at iteration {iteration}: {value}")
            }
            OptError::NonFiniteParameter { iteration, tensor, index, value } => {
                write!(
                    f,
                    "Tensor '{tensor}' became non-finite at iteration {iteration}, \
                     element {index}: {value}"
                )
            }

            // ---- Checkpoint ----
            OptError::CheckpointFailed { iteration, text } => {
                write!(f, "Checkpoint at iteration {iteration} failed: {text}")
            }

            // ---- Model ----
            OptError::Model(err) => {
                write!(f, "Model error: {err}")
            }
        }
    }
}

impl From<ModelError> for OptError {
    fn from(err: ModelError) -> Self {
        OptError::Model(err)
    }
}
