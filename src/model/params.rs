//! Per-stroke parameters: primitive ids, control points and inverse scales.
use crate::{
    model::errors::{ModelError, ModelResult},
    optimization::ascent::{ParamTensor, TensorKind},
};
use ndarray::{Array1, Array3, ArrayView1, ArrayView2, ArrayView3, Axis, Ix1, Ix3};

/// One stroke of a character type.
///
/// `ids[j]` is the primitive of sub-stroke `j`; `shapes` has shape
/// `[nsub, ncpt, 2]` and `invscales` has shape `[nsub]`. Ids and the
/// sub-stroke count never change after construction; only the optimizer
/// writes the continuous values.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeParams {
    ids: Vec<usize>,
    shapes: ParamTensor,
    invscales: ParamTensor,
}

impl StrokeParams {
    /// # Errors
    /// - [`ModelError::SubStrokeCountMismatch`] if the three sizes disagree.
    /// - [`ModelError::ShapeDimMismatch`] if `shapes` is not `[nsub, ncpt >= 2, 2]`.
    pub fn new(ids: Vec<usize>, shapes: Array3<f64>, invscales: Array1<f64>) -> ModelResult<Self> {
        let (nsub, ncpt, coords) = shapes.dim();
        if ids.len() != nsub || invscales.len() != nsub {
            return Err(ModelError::SubStrokeCountMismatch {
                ids: ids.len(),
                shapes: nsub,
                invscales: invscales.len(),
            });
        }
        if ncpt < 2 || coords != 2 {
            return Err(ModelError::ShapeDimMismatch {
                expected: vec![nsub, ncpt.max(2), 2],
                found: vec![nsub, ncpt, coords],
            });
        }
        Ok(Self {
            ids,
            shapes: ParamTensor::new(TensorKind::Shape, shapes.into_dyn()),
            invscales: ParamTensor::new(TensorKind::InvScale, invscales.into_dyn()),
        })
    }

    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Number of sub-strokes.
    pub fn nsub(&self) -> usize {
        self.ids.len()
    }

    /// Control points per sub-stroke.
    pub fn ncpt(&self) -> usize {
        self.shapes.shape()[1]
    }

    pub fn shapes(&self) -> &ParamTensor {
        &self.shapes
    }

    pub fn invscales(&self) -> &ParamTensor {
        &self.invscales
    }

    pub fn shapes_mut(&mut self) -> &mut ParamTensor {
        &mut self.shapes
    }

    pub fn invscales_mut(&mut self) -> &mut ParamTensor {
        &mut self.invscales
    }

    /// Both tensors at once, for owners that hand them to the optimizer.
    pub fn tensors_mut(&mut self) -> (&mut ParamTensor, &mut ParamTensor) {
        (&mut self.shapes, &mut self.invscales)
    }

    /// Current control points as `[nsub, ncpt, 2]`.
    pub fn shapes_view(&self) -> ModelResult<ArrayView3<'_, f64>> {
        let found = self.shapes.shape().to_vec();
        self.shapes.value().view().into_dimensionality::<Ix3>().map_err(|_| {
            ModelError::ShapeDimMismatch { expected: vec![self.nsub(), self.ncpt(), 2], found }
        })
    }

    /// Current inverse scales as `[nsub]`.
    pub fn invscales_view(&self) -> ModelResult<ArrayView1<'_, f64>> {
        let found = self.invscales.shape().to_vec();
        self.invscales
            .value()
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| ModelError::ShapeDimMismatch { expected: vec![self.nsub()], found })
    }

    /// Control points of sub-stroke `j` as `ncpt × 2`.
    pub fn block(&self, j: usize) -> ModelResult<ArrayView2<'_, f64>> {
        Ok(self.shapes_view()?.index_axis_move(Axis(0), j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    // Purpose
    // -------
    // The constructor enforces one shape block and one scale per id.
    //
    // Given
    // -----
    // - Two ids with a single shape block, and two ids with three scales.
    //
    // Expect
    // ------
    // - `SubStrokeCountMismatch` reporting all three sizes.
    fn mismatched_cardinalities_are_rejected() {
        let err =
            StrokeParams::new(vec![0, 1], Array3::zeros((1, 5, 2)), arr1(&[0.1, 0.1])).unwrap_err();
        assert_eq!(err, ModelError::SubStrokeCountMismatch { ids: 2, shapes: 1, invscales: 2 });

        let scales = arr1(&[0.1, 0.1, 0.1]);
        let err = StrokeParams::new(vec![0, 1], Array3::zeros((2, 5, 2)), scales).unwrap_err();
        assert_eq!(err, ModelError::SubStrokeCountMismatch { ids: 2, shapes: 2, invscales: 3 });
    }

    #[test]
    fn three_dimensional_points_are_rejected() {
        let err = StrokeParams::new(vec![4], Array3::zeros((1, 5, 3)), arr1(&[0.1])).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeDimMismatch { expected: vec![1, 5, 2], found: vec![1, 5, 3] }
        );
    }

    #[test]
    // Purpose
    // -------
    // Views expose the stored tensors with their typed dimensionality.
    //
    // Given
    // -----
    // - Two sub-strokes of three control points with distinct values.
    //
    // Expect
    // ------
    // - `block(1)` returns the second `3 × 2` block; tensors carry the
    //   shape and inverse-scale kinds.
    fn views_and_kinds_match_the_layout() {
        let shapes = Array3::from_shape_fn((2, 3, 2), |(j, k, c)| (j * 10 + k * 2 + c) as f64);
        let stroke = StrokeParams::new(vec![2, 5], shapes, arr1(&[0.05, 0.07])).unwrap();

        let block = stroke.block(1).unwrap();

        assert_eq!(block.dim(), (3, 2));
        assert_eq!(block[[2, 1]], 15.0);
        assert_eq!(stroke.invscales_view().unwrap()[1], 0.07);
        assert_eq!(stroke.shapes().kind(), TensorKind::Shape);
        assert_eq!(stroke.invscales().kind(), TensorKind::InvScale);
        assert_eq!((stroke.nsub(), stroke.ncpt()), (2, 3));
    }
}
