//! Per-primitive shape and scale priors.
//!
//! - [`ShapePrior`]: multivariate normal over the flattened `ncpt × 2`
//!   control points of one sub-stroke (row-major: point `k`, coordinate `c`
//!   at index `2k + c`).
//! - [`ScalePrior`]: gamma over the inverse scale of one sub-stroke, with
//!   shape `k` and rate `r`.
//!
//! Both expose log-density, gradient of the log-density and sampling. The
//! gradient uses exactly the statistics the log-density uses.
use crate::{
    library::errors::{LibraryError, LibraryResult},
    optimization::numerical_stability::transformations::LN_2PI,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use statrs::distribution::{Continuous, Gamma};

/// Multivariate normal prior on one sub-stroke's control points.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePrior {
    mean: Array1<f64>,
    cov: Array2<f64>,
    precision: Array2<f64>,
    chol_lower: Array2<f64>,
    ln_norm: f64,
}

impl ShapePrior {
    /// Build the prior from a mean and covariance.
    ///
    /// # Errors
    /// - [`LibraryError::DimMismatch`] if `cov` is not `d × d` for `d = mean.len()`.
    /// - [`LibraryError::NonFiniteStat`] for NaN/±inf entries.
    /// - [`LibraryError::NotPositiveDefinite`] if the Cholesky factorization fails.
    pub fn new(primitive: usize, mean: Array1<f64>, cov: &Array2<f64>) -> LibraryResult<Self> {
        let d = mean.len();
        if cov.nrows() != d || cov.ncols() != d {
            return Err(LibraryError::DimMismatch {
                field: "shape_cov",
                expected: d * d,
                found: cov.len(),
            });
        }
        if let Some((index, &value)) = mean.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(LibraryError::NonFiniteStat { field: "shape_mean", index, value });
        }
        if let Some((index, &value)) = cov.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(LibraryError::NonFiniteStat { field: "shape_cov", index, value });
        }

        let mut cov_nalg = DMatrix::<f64>::zeros(d, d);
        fill_dmatrix(cov, &mut cov_nalg);
        let chol = cov_nalg.cholesky().ok_or(LibraryError::NotPositiveDefinite { primitive })?;
        let l = chol.l();
        let inv = chol.inverse();
        let ln_det: f64 = 2.0 * (0..d).map(|i| l[(i, i)].ln()).sum::<f64>();

        let chol_lower = Array2::from_shape_fn((d, d), |(i, j)| l[(i, j)]);
        let precision = Array2::from_shape_fn((d, d), |(i, j)| inv[(i, j)]);
        let ln_norm = -0.5 * (d as f64 * LN_2PI + ln_det);
        Ok(Self { mean, cov: cov.clone(), precision, chol_lower, ln_norm })
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn cov(&self) -> &Array2<f64> {
        &self.cov
    }

    /// `ln N(x; μ, Σ)`.
    pub fn ln_pdf(&self, x: ArrayView1<'_, f64>) -> f64 {
        let diff = &x - &self.mean;
        self.ln_norm - 0.5 * diff.dot(&self.precision.dot(&diff))
    }

    /// `∇ₓ ln N(x; μ, Σ) = −Σ⁻¹(x − μ)`.
    pub fn grad_ln_pdf(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        let diff = &x - &self.mean;
        -self.precision.dot(&diff)
    }

    /// Draw `μ + L z` with `z ~ N(0, I)` and `Σ = L Lᵀ`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<f64> {
        let z: Array1<f64> = (0..self.dim())
            .map(|_| -> f64 { StandardNormal.sample(rng) })
            .collect();
        &self.mean + &self.chol_lower.dot(&z)
    }
}

/// Gamma prior on one sub-stroke's inverse scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalePrior {
    shape: f64,
    rate: f64,
    dist: Gamma,
}

impl ScalePrior {
    /// # Errors
    /// [`LibraryError::InvalidGammaParam`] if `shape` or `rate` is not finite
    /// and strictly positive.
    pub fn new(primitive: usize, shape: f64, rate: f64) -> LibraryResult<Self> {
        let checks = [
            (shape, "Gamma shape must be finite and > 0."),
            (rate, "Gamma rate must be finite and > 0."),
        ];
        for (value, reason) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(LibraryError::InvalidGammaParam { primitive, value, reason });
            }
        }
        let dist = Gamma::new(shape, rate).map_err(|_| LibraryError::InvalidGammaParam {
            primitive,
            value: shape,
            reason: "Rejected by the gamma distribution constructor.",
        })?;
        Ok(Self { shape, rate, dist })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// `ln Gamma(x; k, r)`; `-∞` for `x <= 0`.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        if x <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.dist.ln_pdf(x)
    }

    /// `d/dx ln Gamma(x; k, r) = (k − 1)/x − r`.
    pub fn grad_ln_pdf(&self, x: f64) -> f64 {
        (self.shape - 1.0) / x - self.rate
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

// ---- Helper methods ----

/// Copy a square `ndarray` matrix into a preallocated `DMatrix`, column by
/// column.
fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    let n = src.ncols();
    for j in 0..n {
        for i in 0..src.nrows() {
            dst[(i, j)] = src[[i, j]];
        }
    }
}
