//! ascent::finite_diff — finite-difference gradients over registered tensors.
//!
//! Purpose
//! -------
//! Provide a gradient path for objectives that do not implement
//! [`LogLikelihood::backward`], and a checker that compares analytic
//! gradients against finite differences, without the rest of the optimizer
//! depending on the `finitediff` API directly.
//!
//! Key behaviors
//! -------------
//! - [`fd_gradient`] flattens the registered values of an owner, evaluates
//!   the objective on a scratch clone of the owner at perturbed points
//!   (central differences), and validates the result.
//! - [`fd_backward`] adds that gradient into the owner's buffers, matching
//!   the accumulate contract of an analytic backward pass. Non-finite
//!   elements are only rejected when the caller asks for it.
//! - [`max_gradient_error`] runs an analytic backward on a clone and
//!   reports the largest absolute deviation from finite differences.
//!
//! Invariants & assumptions
//! ------------------------
//! - The owner itself is never mutated while differencing; all perturbed
//!   evaluations go through a clone held in a `RefCell`.
//! - Any error raised by the objective inside the differencing closure is
//!   captured in a shared cell and surfaced as a hard failure, the first
//!   error winning.
//!
//! Conventions
//! -----------
//! - Central differences are used; forward differences are not needed
//!   because every objective here is smooth on its domain.
//!
//! Testing notes
//! -------------
//! - Unit tests cover a quadratic with a known gradient, error capture
//!   from the closure, and the analytic-vs-FD checker.
use crate::optimization::{
    ascent::{
        Grad, Theta,
        traits::{LogLikelihood, ParameterOwner},
        validation::validate_grad,
    },
    errors::{OptError, OptResult},
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Central-difference gradient of `objective` w.r.t. the registered values.
///
/// # Errors
/// - [`OptError::NoRegisteredTensors`] if nothing is registered.
/// - Any error raised by `objective.value` at a perturbed point.
/// - [`OptError::InvalidGradient`] if some element is NaN/±inf.
pub fn fd_gradient<F, O>(objective: &F, owner: &O) -> OptResult<Grad>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
{
    let grad = central_gradient(objective, owner)?;
    validate_grad(&grad, grad.len())?;
    Ok(grad)
}

/// Accumulate a finite-difference gradient into the owner's buffers.
///
/// With `check_finite` unset, NaN/±inf elements are accumulated as they
/// are, matching an analytic backward pass.
///
/// # Errors
/// - As [`fd_gradient`], except that [`OptError::InvalidGradient`] is only
///   raised when `check_finite` is set.
pub fn fd_backward<F, O>(objective: &F, owner: &mut O, check_finite: bool) -> OptResult<()>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
{
    let grad = central_gradient(objective, owner)?;
    if check_finite {
        validate_grad(&grad, grad.len())?;
    }
    owner.accumulate_registered_grads(&grad)
}

// ---- Helper methods ----

fn central_gradient<F, O>(objective: &F, owner: &O) -> OptResult<Grad>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
{
    let theta = owner.registered_values();
    if theta.is_empty() {
        return Err(OptError::NoRegisteredTensors);
    }
    let scratch = RefCell::new(owner.clone());
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let func = |x: &Theta| -> f64 {
        let mut shifted = scratch.borrow_mut();
        let evaluated = shifted.set_registered_values(x).and_then(|_| objective.value(&shifted));
        match evaluated {
            Ok(v) => v,
            Err(e) => {
                closure_err.borrow_mut().get_or_insert(e);
                f64::NAN
            }
        }
    };
    let grad = theta.central_diff(&func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    Ok(grad)
}

/// Largest `|analytic − finite difference|` over all registered elements.
///
/// The analytic gradient is computed on a clone with zeroed buffers, so the
/// caller's gradients are untouched.
pub fn max_gradient_error<F, O>(objective: &F, owner: &O) -> OptResult<f64>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
{
    let mut copy = owner.clone();
    copy.zero_grad();
    objective.backward(&mut copy)?;
    let analytic = copy.registered_grads();
    let numeric = fd_gradient(objective, owner)?;
    Ok(analytic.iter().zip(numeric.iter()).map(|(a, n)| (a - n).abs()).fold(0.0, f64::max))
}
