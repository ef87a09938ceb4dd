//! High-level entry points for maximizing an objective by projected ascent.
use crate::optimization::{
    ascent::{
        run::run_ascent,
        traits::{AscentOptions, AscentOutcome, Checkpoint, LogLikelihood, ParameterOwner},
    },
    errors::OptResult,
};
use slog::{Discard, Logger, o};

/// Maximize `objective` over the registered tensors of `owner`.
///
/// Runs without a checkpoint hook and with a discarding logger; see
/// [`maximize_projected_with`] for the full form.
///
/// # Errors
/// Propagates every error of [`run_ascent`].
///
/// # Example
/// ```no_run
/// use bpl_rs::optimization::ascent::{
///     AscentOptions, BoundPolicy, LogLikelihood, ParamTensor, ParameterOwner, TensorKind,
///     maximize_projected,
/// };
/// use bpl_rs::optimization::errors::OptResult;
/// use ndarray::arr1;
///
/// #[derive(Clone)]
/// struct One(ParamTensor);
/// impl ParameterOwner for One {
///     fn tensors(&self) -> Vec<&ParamTensor> { vec![&self.0] }
///     fn tensors_mut(&mut self) -> Vec<&mut ParamTensor> { vec![&mut self.0] }
/// }
///
/// struct Peak;
/// impl LogLikelihood<One> for Peak {
///     fn value(&self, o: &One) -> OptResult<f64> {
///         Ok(-o.0.value().iter().map(|x| (x - 3.0).powi(2)).sum::<f64>())
///     }
/// }
///
/// let mut owner = One(ParamTensor::new(TensorKind::Shape, arr1(&[0.0]).into_dyn()));
/// BoundPolicy::default().register(&mut owner)?;
/// let out = maximize_projected(&Peak, &mut owner, &AscentOptions::default())?;
/// println!("ℓ: {:?} -> {}", out.first(), out.final_value);
/// # Ok::<(), bpl_rs::optimization::errors::OptError>(())
/// ```
pub fn maximize_projected<F, O>(
    objective: &F, owner: &mut O, opts: &AscentOptions,
) -> OptResult<AscentOutcome>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
{
    let logger = Logger::root(Discard, o!());
    let mut no_checkpoint = |_: usize, _: &O| -> OptResult<()> { Ok(()) };
    run_ascent(objective, owner, opts, &mut no_checkpoint, &logger)
}

/// Maximize `objective` with a checkpoint hook and a caller-supplied logger.
///
/// # Errors
/// Propagates every error of [`run_ascent`], including errors returned by
/// `checkpoint`.
pub fn maximize_projected_with<F, O, C>(
    objective: &F, owner: &mut O, opts: &AscentOptions, checkpoint: &mut C, logger: &Logger,
) -> OptResult<AscentOutcome>
where
    F: LogLikelihood<O> + ?Sized,
    O: ParameterOwner + Clone,
    C: Checkpoint<O> + ?Sized,
{
    run_ascent(objective, owner, opts, checkpoint, logger)
}
