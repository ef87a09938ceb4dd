//! ascent::policy — which tensors to optimize, and within which bounds.
//!
//! A [`BoundPolicy`] maps each [`TensorKind`] to either "not optimized" or
//! a [`BoxBounds`]. Registering an owner walks its tensors, turns
//! `requires_grad` on for kinds with a rule, installs the bounds, and turns
//! it off for everything else.
//!
//! The default policy optimizes stroke shapes without bounds and inverse
//! scales with a lower bound of `1e-4`; relation eval spots are not
//! optimized.
use crate::optimization::{
    ascent::{
        tensor::{BoxBounds, TensorKind},
        traits::ParameterOwner,
        types::DEFAULT_SCALE_FLOOR,
    },
    errors::OptResult,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundPolicy {
    rules: HashMap<TensorKind, BoxBounds>,
}

impl BoundPolicy {
    /// A policy that optimizes nothing.
    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Optimize tensors of `kind` within `bounds`.
    pub fn with(mut self, kind: TensorKind, bounds: BoxBounds) -> Self {
        self.rules.insert(kind, bounds);
        self
    }

    /// Stop optimizing tensors of `kind`.
    pub fn without(mut self, kind: TensorKind) -> Self {
        self.rules.remove(&kind);
        self
    }

    /// Apply the policy to every tensor of `owner`.
    ///
    /// Returns the number of registered tensors.
    ///
    /// # Errors
    /// Propagates bound validation errors from
    /// [`ParamTensor::set_bounds`](crate::optimization::ascent::tensor::ParamTensor::set_bounds).
    pub fn register<O: ParameterOwner + ?Sized>(&self, owner: &mut O) -> OptResult<usize> {
        let mut registered = 0;
        for tensor in owner.tensors_mut() {
            match self.rules.get(&tensor.kind()) {
                Some(bounds) => {
                    tensor.set_bounds(bounds.clone())?;
                    tensor.set_requires_grad(true);
                    registered += 1;
                }
                None => {
                    tensor.set_bounds(BoxBounds::unbounded())?;
                    tensor.set_requires_grad(false);
                }
            }
        }
        Ok(registered)
    }
}

impl Default for BoundPolicy {
    fn default() -> Self {
        Self::empty()
            .with(TensorKind::Shape, BoxBounds::unbounded())
            .with(TensorKind::InvScale, BoxBounds::lower(DEFAULT_SCALE_FLOOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::ascent::tensor::{Bound, ParamTensor};
    use ndarray::arr1;

    struct Trio(Vec<ParamTensor>);

    impl ParameterOwner for Trio {
        fn tensors(&self) -> Vec<&ParamTensor> {
            self.0.iter().collect()
        }
        fn tensors_mut(&mut self) -> Vec<&mut ParamTensor> {
            self.0.iter_mut().collect()
        }
    }

    fn trio() -> Trio {
        Trio(vec![
            ParamTensor::new(TensorKind::Shape, arr1(&[0.0, 1.0]).into_dyn()),
            ParamTensor::new(TensorKind::InvScale, arr1(&[0.5]).into_dyn()),
            ParamTensor::new(TensorKind::EvalSpot, arr1(&[0.3]).into_dyn()),
        ])
    }

    #[test]
    // Purpose
    // -------
    // The default policy registers shapes and scales but not eval spots.
    //
    // Given
    // -----
    // - One tensor of each kind.
    //
    // Expect
    // ------
    // - Two registered tensors; the scale carries the 1e-4 floor.
    fn default_policy_registers_shapes_and_scales() {
        let mut owner = trio();

        let n = BoundPolicy::default().register(&mut owner).unwrap();

        assert_eq!(n, 2);
        assert!(owner.0[0].requires_grad() && owner.0[0].bounds().is_unbounded());
        assert_eq!(owner.0[1].bounds().lower, Some(Bound::Scalar(1e-4)));
        assert!(!owner.0[2].requires_grad());
    }

    #[test]
    fn custom_policy_can_add_eval_spots_and_drop_shapes() {
        let mut owner = trio();
        let policy = BoundPolicy::default()
            .without(TensorKind::Shape)
            .with(TensorKind::EvalSpot, BoxBounds::between(0.0, 1.0));

        let n = policy.register(&mut owner).unwrap();

        assert_eq!(n, 2);
        assert!(!owner.0[0].requires_grad());
        assert!(owner.0[2].requires_grad());
    }
}
