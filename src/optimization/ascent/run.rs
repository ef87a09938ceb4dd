//! Execution loop for projected gradient ascent.
use crate::optimization::{
    ascent::{
        finite_diff::fd_backward,
        traits::{AscentOptions, AscentOutcome, Checkpoint, LogLikelihood, ParameterOwner},
        validation::{validate_objective, validate_parameters},
    },
    errors::{OptError, OptResult},
};
use slog::{Logger, debug, info};

/// Run `opts.max_iter` iterations of projected gradient ascent.
///
/// Each iteration, in order:
/// 1. at `iter % checkpoint_every == 0`, call `checkpoint` with the owner;
/// 2. evaluate `ℓ` at the current values;
/// 3. accumulate `∇ℓ` into every registered tensor (analytic `backward`,
///    falling back to central finite differences once if it is missing);
/// 4. for each registered tensor: `value += α · grad`, clamp into its box,
///    zero its gradient;
/// 5. record the objective from step 2.
///
/// Termination is by iteration count only. All gradient buffers are zeroed
/// before the first iteration.
///
/// # Errors
/// - [`OptError::NoRegisteredTensors`] if the owner has nothing to optimize.
/// - Any error from the objective, its backward pass or the checkpoint.
/// - [`OptError::NonFiniteObjective`] / [`OptError::NonFiniteParameter`]
///   when `opts.halt_on_non_finite` is set and a numerical fault occurs.
pub fn run_ascent<F, O, C>(
    objective: &F, owner: &mut O, opts: &AscentOptions, checkpoint: &mut C, logger: &Logger,
) -> OptResult<AscentOutcome>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
    C: Checkpoint<O> + ?Sized,
{
    let n_registered = owner.n_registered();
    if n_registered == 0 {
        return Err(OptError::NoRegisteredTensors);
    }
    debug!(logger, "starting projected ascent";
        "tensors" => n_registered, "free_params" => owner.n_free(),
        "max_iter" => opts.max_iter, "step_size" => opts.step_size);

    owner.zero_grad();
    let mut trajectory = Vec::with_capacity(opts.max_iter);
    let mut use_fd = false;
    let mut last_grad_norm = 0.0;

    for iter in 0..opts.max_iter {
        let at_checkpoint = iter % opts.checkpoint_every == 0;
        if at_checkpoint {
            checkpoint.on_checkpoint(iter, owner)?;
        }

        let value = objective.value(owner)?;
        if at_checkpoint {
            info!(logger, "checkpoint"; "iteration" => iter, "objective" => value);
        }
        if opts.halt_on_non_finite {
            validate_objective(iter, value)?;
        }

        accumulate_gradient(objective, owner, &mut use_fd, opts.halt_on_non_finite, logger)?;
        last_grad_norm = owner.grad_norm();
        if opts.verbose {
            info!(logger, "iteration"; "iteration" => iter, "objective" => value,
                "grad_norm" => last_grad_norm);
        }

        for tensor in owner.tensors_mut().into_iter().filter(|t| t.requires_grad()) {
            tensor.ascent_step(opts.step_size);
            tensor.project();
        }
        owner.zero_grad();
        if opts.halt_on_non_finite {
            validate_parameters(iter, owner)?;
        }

        trajectory.push(value);
    }

    let final_value = objective.value(owner)?;
    debug!(logger, "projected ascent finished";
        "iterations" => opts.max_iter,
        "initial" => trajectory.first().copied().unwrap_or(f64::NAN),
        "final" => final_value, "grad_norm" => last_grad_norm);

    Ok(AscentOutcome { trajectory, iterations: opts.max_iter, final_value, last_grad_norm })
}

// ---- Helper methods ----

fn accumulate_gradient<F, O>(
    objective: &F, owner: &mut O, use_fd: &mut bool, check_finite: bool, logger: &Logger,
) -> OptResult<()>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
{
    if !*use_fd {
        match objective.backward(owner) {
            Err(OptError::GradientNotImplemented) => {
                debug!(logger, "no analytic gradient; using finite differences");
                *use_fd = true;
            }
            other => return other,
        }
    }
    fd_backward(objective, owner, check_finite)
}
