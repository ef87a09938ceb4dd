/// Result alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Image height and width must both be > 0.
    InvalidImageSize { height: usize, width: usize },

    /// Curve sampling needs at least two points per sub-stroke.
    InvalidSplineSamples { samples: usize },

    /// Ink parameters must be finite and within their documented ranges.
    InvalidInkParam { name: &'static str, value: f64, reason: &'static str },

    /// Pixel noise must lie in [0, 1].
    InvalidEpsilon { value: f64 },

    /// Blur width must be finite and >= 0.
    InvalidBlurSigma { value: f64 },

    /// Affine entries must be finite.
    InvalidAffine { index: usize, value: f64 },

    /// Spline control points must form an `(ncpt, 2)` block with ncpt >= 2.
    InvalidControlPoints { rows: usize, cols: usize },

    /// A trajectory point is NaN/±inf.
    NonFiniteTrajectory { stroke: usize, substroke: usize },
}

impl std::error::Error for RenderError {}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InvalidImageSize { height, width } => {
                write!(f, "Image size must be positive; got {height}x{width}")
            }
            RenderError::InvalidSplineSamples { samples } => {
                write!(f, "Spline sampling needs >= 2 points per sub-stroke; got {samples}")
            }
            RenderError::InvalidInkParam { name, value, reason } => {
                write!(f, "Invalid ink parameter '{name}' = {value}: {reason}")
            }
            RenderError::InvalidEpsilon { value } => {
                write!(f, "Pixel noise epsilon must lie in [0, 1]; got {value}")
            }
            RenderError::InvalidBlurSigma { value } => {
                write!(f, "Blur sigma must be finite and >= 0; got {value}")
            }
            RenderError::InvalidAffine { index, value } => {
                write!(f, "Affine entry {index} must be finite; got {value}")
            }
            RenderError::InvalidControlPoints { rows, cols } => {
                write!(f, "Control points must be an (ncpt >= 2, 2) block; got ({rows}, {cols})")
            }
            RenderError::NonFiniteTrajectory { stroke, substroke } => {
                write!(f, "Trajectory of stroke {stroke}, sub-stroke {substroke} is non-finite")
            }
        }
    }
}
