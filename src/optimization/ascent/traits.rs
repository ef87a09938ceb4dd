//! Public API surface for projected gradient ascent.
//!
//! - [`ParameterOwner`]: anything that exposes a list of [`ParamTensor`]s.
//! - [`LogLikelihood`]: objective users implement over a parameter owner.
//! - [`Checkpoint`]: side-channel hook invoked at a fixed cadence.
//! - [`AscentOptions`]: configuration for the optimizer.
//! - [`AscentOutcome`]: normalized result returned by `maximize_projected`.
//!
//! Convention: we *maximize* `ℓ` directly. Analytic gradients are gradients
//! of `ℓ` and are added into each registered tensor's buffer by
//! [`LogLikelihood::backward`].
use crate::optimization::{
    ascent::{
        Grad, Theta,
        tensor::ParamTensor,
        types::{DEFAULT_CHECKPOINT_EVERY, DEFAULT_MAX_ITER, DEFAULT_STEP_SIZE},
        validation::{verify_checkpoint_every, verify_max_iter, verify_step_size},
    },
    errors::{OptError, OptResult},
};
use ndarray::IxDyn;

/// Owner of an ordered, fixed list of parameter tensors.
///
/// Required:
/// - `tensors` / `tensors_mut`: every tensor, registered or not, in a
///   stable order. Both must return the same order.
///
/// Provided methods operate on the *registered* subset only
/// (`requires_grad == true`), flattening each tensor row-major and
/// concatenating in owner order.
pub trait ParameterOwner {
    fn tensors(&self) -> Vec<&ParamTensor>;
    fn tensors_mut(&mut self) -> Vec<&mut ParamTensor>;

    /// Number of registered tensors.
    fn n_registered(&self) -> usize {
        self.tensors().iter().filter(|t| t.requires_grad()).count()
    }

    /// Total number of registered scalar parameters.
    fn n_free(&self) -> usize {
        self.tensors().iter().filter(|t| t.requires_grad()).map(|t| t.len()).sum()
    }

    /// Zero every gradient buffer.
    fn zero_grad(&mut self) {
        for t in self.tensors_mut() {
            t.zero_grad();
        }
    }

    /// Flatten all registered values into one vector.
    fn registered_values(&self) -> Theta {
        self.tensors()
            .into_iter()
            .filter(|t| t.requires_grad())
            .flat_map(|t| t.value().iter().copied().collect::<Vec<_>>())
            .collect()
    }

    /// Flatten all registered gradients into one vector.
    fn registered_grads(&self) -> Grad {
        self.tensors()
            .into_iter()
            .filter(|t| t.requires_grad())
            .flat_map(|t| t.grad().iter().copied().collect::<Vec<_>>())
            .collect()
    }

    /// Overwrite registered values from a flat vector.
    ///
    /// # Errors
    /// [`OptError::ThetaLengthMismatch`] if `theta.len() != self.n_free()`.
    fn set_registered_values(&mut self, theta: &Theta) -> OptResult<()> {
        let expected = self.n_free();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        let mut offset = 0;
        for t in self.tensors_mut().into_iter().filter(|t| t.requires_grad()) {
            let n = t.len();
            let block = theta.slice(ndarray::s![offset..offset + n]);
            t.value_mut().iter_mut().zip(block.iter()).for_each(|(v, &x)| *v = x);
            offset += n;
        }
        Ok(())
    }

    /// Add a flat gradient into the registered gradient buffers.
    ///
    /// # Errors
    /// [`OptError::ThetaLengthMismatch`] if `grad.len() != self.n_free()`.
    fn accumulate_registered_grads(&mut self, grad: &Grad) -> OptResult<()> {
        let expected = self.n_free();
        if grad.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: grad.len() });
        }
        let mut offset = 0;
        for t in self.tensors_mut().into_iter().filter(|t| t.requires_grad()) {
            let n = t.len();
            let block = grad.slice(ndarray::s![offset..offset + n]).to_owned();
            let shaped = block.into_shape(IxDyn(t.shape())).map_err(|_| {
                OptError::GradientDimMismatch {
                    tensor: t.name(),
                    expected: t.shape().to_vec(),
                    found: vec![n],
                }
            })?;
            t.accumulate_grad(shaped.view())?;
            offset += n;
        }
        Ok(())
    }

    /// Euclidean norm of all registered gradients.
    fn grad_norm(&self) -> f64 {
        self.tensors()
            .into_iter()
            .filter(|t| t.requires_grad())
            .map(|t| t.grad().iter().map(|g| g * g).sum::<f64>())
            .sum::<f64>()
            .sqrt()
    }
}

/// User-implemented objective over a parameter owner.
///
/// Required:
/// - `value(&O) -> OptResult<f64>`: evaluate `ℓ` at the owner's current values.
///
/// Optional:
/// - `backward(&mut O) -> OptResult<()>`: add `∂ℓ/∂tensor` into the gradient
///   buffer of every registered tensor. If not implemented, central finite
///   differences over the registered values are used automatically.
pub trait LogLikelihood<O: ParameterOwner> {
    fn value(&self, owner: &O) -> OptResult<f64>;

    fn backward(&self, _owner: &mut O) -> OptResult<()> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Hook invoked at iterations `0, every, 2·every, …` before the objective
/// of that iteration is evaluated. It sees the owner read-only.
pub trait Checkpoint<O> {
    fn on_checkpoint(&mut self, iteration: usize, owner: &O) -> OptResult<()>;
}

impl<O, F> Checkpoint<O> for F
where
    F: FnMut(usize, &O) -> OptResult<()>,
{
    fn on_checkpoint(&mut self, iteration: usize, owner: &O) -> OptResult<()> {
        self(iteration, owner)
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `max_iter` — fixed iteration budget; the only termination rule.
/// - `step_size` — learning rate `α` in `θ ← θ + α∇ℓ`.
/// - `checkpoint_every` — cadence of the checkpoint hook.
/// - `halt_on_non_finite` — abort with context on NaN/±inf objective or
///   parameters instead of letting them propagate.
/// - `verbose` — log every iteration, not just checkpoints.
///
/// Default:
/// - `max_iter = 1000`, `step_size = 1e-3`, `checkpoint_every = 100`
/// - `halt_on_non_finite = false`, `verbose = false`
#[derive(Debug, Clone, PartialEq)]
pub struct AscentOptions {
    pub max_iter: usize,
    pub step_size: f64,
    pub checkpoint_every: usize,
    pub halt_on_non_finite: bool,
    pub verbose: bool,
}

impl AscentOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    /// - [`OptError::InvalidStepSize`] if `step_size` is not finite and positive.
    /// - [`OptError::InvalidCheckpointEvery`] if `checkpoint_every == 0`.
    pub fn new(
        max_iter: usize, step_size: f64, checkpoint_every: usize, halt_on_non_finite: bool,
        verbose: bool,
    ) -> OptResult<Self> {
        verify_max_iter(max_iter)?;
        verify_step_size(step_size)?;
        verify_checkpoint_every(checkpoint_every)?;
        Ok(Self { max_iter, step_size, checkpoint_every, halt_on_non_finite, verbose })
    }
}

impl Default for AscentOptions {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            step_size: DEFAULT_STEP_SIZE,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            halt_on_non_finite: false,
            verbose: false,
        }
    }
}

/// Result of a projected-ascent run.
///
/// - `trajectory`: objective at the *start* of each iteration (pre-update),
///   exactly `iterations` entries.
/// - `final_value`: objective after the last update.
/// - `last_grad_norm`: norm of the registered gradient in the last iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct AscentOutcome {
    pub trajectory: Vec<f64>,
    pub iterations: usize,
    pub final_value: f64,
    pub last_grad_norm: f64,
}

impl AscentOutcome {
    pub fn first(&self) -> Option<f64> {
        self.trajectory.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.trajectory.last().copied()
    }

    /// Largest finite recorded objective and its iteration.
    pub fn best(&self) -> Option<(usize, f64)> {
        self.trajectory
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}
