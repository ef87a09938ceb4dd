//! Validation helpers for projected gradient ascent.
//!
//! - **Option checks**: [`verify_step_size`], [`verify_max_iter`],
//!   [`verify_checkpoint_every`] reject unusable configurations up front.
//! - **Gradient validation**: [`validate_grad`] enforces dimension and
//!   finiteness of flattened finite-difference gradients.
//! - **Run-time checks**: [`validate_objective`] and [`validate_parameters`]
//!   turn NaN/±inf into errors carrying iteration and tensor context; they
//!   are only consulted when a run opts into halting on numerical faults.
use crate::optimization::{
    ascent::{Grad, traits::ParameterOwner},
    errors::{OptError, OptResult},
};

/// Step size must be finite and strictly positive.
///
/// # Errors
/// Returns [`OptError::InvalidStepSize`] otherwise.
pub fn verify_step_size(step_size: f64) -> OptResult<()> {
    if !step_size.is_finite() {
        return Err(OptError::InvalidStepSize { step_size, reason: "Step size must be finite." });
    }
    if step_size <= 0.0 {
        return Err(OptError::InvalidStepSize { step_size, reason: "Step size must be positive." });
    }
    Ok(())
}

/// Iteration budget must be `> 0`.
///
/// # Errors
/// Returns [`OptError::InvalidMaxIter`] for `0`.
pub fn verify_max_iter(max_iter: usize) -> OptResult<()> {
    if max_iter == 0 {
        return Err(OptError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Checkpoint cadence must be `> 0`.
///
/// # Errors
/// Returns [`OptError::InvalidCheckpointEvery`] for `0`.
pub fn verify_checkpoint_every(every: usize) -> OptResult<()> {
    if every == 0 {
        return Err(OptError::InvalidCheckpointEvery {
            every,
            reason: "Checkpoint cadence must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate a flattened gradient against dimension and finiteness.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] for the first non-finite element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim, actual: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Objective value must be finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteObjective`] with the iteration index.
pub fn validate_objective(iteration: usize, value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteObjective { iteration, value });
    }
    Ok(())
}

/// Every element of every registered tensor must be finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteParameter`] naming the first offending
/// tensor and flat element index.
pub fn validate_parameters<O: ParameterOwner + ?Sized>(
    iteration: usize, owner: &O,
) -> OptResult<()> {
    for tensor in owner.tensors().into_iter().filter(|t| t.requires_grad()) {
        let bad = tensor.value().iter().enumerate().find(|(_, v)| !v.is_finite());
        if let Some((index, &value)) = bad {
            return Err(OptError::NonFiniteParameter {
                iteration,
                tensor: tensor.name(),
                index,
                value,
            });
        }
    }
    Ok(())
}
