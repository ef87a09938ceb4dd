//! Spatial relations between strokes.
//!
//! Every stroke carries exactly one [`Relation`] that decides where its
//! first sub-stroke starts:
//! - `Independent`: at a free canvas position `gpos`.
//! - `Start` / `End`: at the first / last point of an earlier stroke.
//! - `Mid`: on sub-stroke `subid` of an earlier stroke, at spline parameter
//!   `eval_spot ∈ [0, ncpt − 3]`.
//!
//! Positions are read off the pixel-space control points of earlier strokes
//! (see `character::motor_control_points`); the clamped spline passes
//! through its first and last control point, so `Start`/`End` never need a
//! spline evaluation.
use crate::{
    model::errors::{ModelError, ModelResult},
    optimization::ascent::{ParamTensor, TensorKind},
    rendering::bspline,
};
use ndarray::{Array2, arr1};

#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Independent { gpos: [f64; 2] },
    Start { attach: usize },
    End { attach: usize },
    Mid { attach: usize, subid: usize, eval_spot: ParamTensor },
}

impl Relation {
    /// Mid-stroke relation with an `EvalSpot` tensor holding `eval_spot`.
    pub fn mid(attach: usize, subid: usize, eval_spot: f64) -> Self {
        Relation::Mid {
            attach,
            subid,
            eval_spot: ParamTensor::new(TensorKind::EvalSpot, arr1(&[eval_spot]).into_dyn()),
        }
    }

    /// Stroke this relation attaches to, if any.
    pub fn attach(&self) -> Option<usize> {
        match self {
            Relation::Independent { .. } => None,
            Relation::Start { attach }
            | Relation::End { attach }
            | Relation::Mid { attach, .. } => Some(*attach),
        }
    }

    pub fn eval_spot(&self) -> Option<&ParamTensor> {
        match self {
            Relation::Mid { eval_spot, .. } => Some(eval_spot),
            _ => None,
        }
    }

    pub fn eval_spot_mut(&mut self) -> Option<&mut ParamTensor> {
        match self {
            Relation::Mid { eval_spot, .. } => Some(eval_spot),
            _ => None,
        }
    }

    /// Check the relation of stroke `stroke` against the sub-stroke counts
    /// of the strokes before it.
    ///
    /// # Errors
    /// - [`ModelError::InvalidAttachment`] if `attach >= stroke`.
    /// - [`ModelError::InvalidSubStroke`] if a `Mid` relation names a missing
    ///   sub-stroke.
    pub fn validate(&self, stroke: usize, previous_nsub: &[usize]) -> ModelResult<()> {
        let Some(attach) = self.attach() else {
            return Ok(());
        };
        if attach >= stroke || attach >= previous_nsub.len() {
            return Err(ModelError::InvalidAttachment { stroke, attach });
        }
        if let Relation::Mid { subid, .. } = self {
            let nsub = previous_nsub[attach];
            if *subid >= nsub {
                return Err(ModelError::InvalidSubStroke { stroke, attach, subid: *subid, nsub });
            }
        }
        Ok(())
    }

    /// Starting position of the stroke given the pixel-space control points
    /// (`stroke → sub-stroke → ncpt × 2`) of every earlier stroke.
    ///
    /// Assumes [`Relation::validate`] has passed for the same layout.
    pub fn position(&self, previous: &[Vec<Array2<f64>>]) -> ModelResult<[f64; 2]> {
        let missing =
            |attach: usize| ModelError::InvalidAttachment { stroke: previous.len(), attach };
        match self {
            Relation::Independent { gpos } => Ok(*gpos),
            Relation::Start { attach } => {
                let first = previous.get(*attach).and_then(|s| s.first()).ok_or(missing(*attach))?;
                Ok([first[[0, 0]], first[[0, 1]]])
            }
            Relation::End { attach } => {
                let last = previous.get(*attach).and_then(|s| s.last()).ok_or(missing(*attach))?;
                let k = last.nrows() - 1;
                Ok([last[[k, 0]], last[[k, 1]]])
            }
            Relation::Mid { attach, subid, eval_spot } => {
                let cpts =
                    previous.get(*attach).and_then(|s| s.get(*subid)).ok_or(missing(*attach))?;
                let t = spline_fraction(eval_spot.value()[[0]], cpts.nrows());
                Ok(bspline::eval(cpts.view(), t)?)
            }
        }
    }
}

/// Upper end of the `eval_spot` range for sub-strokes of `ncpt` points.
pub fn eval_spot_range(ncpt: usize) -> f64 {
    ncpt.saturating_sub(3) as f64
}

/// Map `eval_spot ∈ [0, ncpt − 3]` onto the normalized spline parameter.
fn spline_fraction(eval_spot: f64, ncpt: usize) -> f64 {
    let range = eval_spot_range(ncpt);
    if range == 0.0 { 0.0 } else { eval_spot / range }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn previous() -> Vec<Vec<Array2<f64>>> {
        vec![vec![
            array![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]],
            array![[4.0, 0.0], [4.0, 1.0], [4.0, 2.0], [4.0, 3.0], [4.0, 4.0]],
        ]]
    }

    #[test]
    // Purpose
    // -------
    // Attached relations read their anchor from the earlier stroke.
    //
    // Given
    // -----
    // - One earlier stroke: a horizontal then a vertical straight sub-stroke.
    //
    // Expect
    // ------
    // - Start → (0, 0); End → (4, 4); Mid on sub-stroke 0 at the midpoint of
    //   the eval-spot range → (2, 0).
    fn positions_follow_the_attached_stroke() {
        let prev = previous();

        let start = Relation::Start { attach: 0 }.position(&prev).unwrap();
        let end = Relation::End { attach: 0 }.position(&prev).unwrap();
        let mid = Relation::mid(0, 0, 1.0).position(&prev).unwrap();

        assert_eq!(start, [0.0, 0.0]);
        assert_eq!(end, [4.0, 4.0]);
        assert!((mid[0] - 2.0).abs() < 1e-12 && mid[1].abs() < 1e-12);
    }

    #[test]
    fn independent_position_is_gpos() {
        let rel = Relation::Independent { gpos: [30.0, 45.0] };
        assert_eq!(rel.position(&[]).unwrap(), [30.0, 45.0]);
        assert_eq!(rel.attach(), None);
    }

    #[test]
    // Purpose
    // -------
    // Relations may only refer to strokes drawn earlier.
    //
    // Given
    // -----
    // - Stroke 1 attaching to stroke 1, and a Mid relation to sub-stroke 2
    //   of a stroke with 2 sub-strokes.
    //
    // Expect
    // ------
    // - `InvalidAttachment` and `InvalidSubStroke` respectively.
    fn forward_and_missing_references_are_rejected() {
        let self_ref = Relation::End { attach: 1 }.validate(1, &[3]);
        let bad_sub = Relation::mid(0, 2, 0.5).validate(1, &[2]);

        assert_eq!(self_ref.unwrap_err(), ModelError::InvalidAttachment { stroke: 1, attach: 1 });
        assert_eq!(
            bad_sub.unwrap_err(),
            ModelError::InvalidSubStroke { stroke: 1, attach: 0, subid: 2, nsub: 2 }
        );
    }
}
