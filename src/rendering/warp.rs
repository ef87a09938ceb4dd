//! Global affine warp of a motor program.
//!
//! The affine is `[x_scale, y_scale, x_shift, y_shift]` and is applied about
//! the centre of mass of every trajectory point, so scaling does not move
//! the character across the canvas.
use crate::rendering::{
    Motor,
    errors::{RenderError, RenderResult},
};

/// Affine that leaves every point in place.
pub const IDENTITY_AFFINE: [f64; 4] = [1.0, 1.0, 0.0, 0.0];

/// Apply `affine` to every point of `motor`, returning a new motor.
///
/// # Errors
/// [`RenderError::InvalidAffine`] if any affine entry is non-finite.
pub fn apply_warp(motor: &Motor, affine: &[f64; 4]) -> RenderResult<Motor> {
    for (index, &value) in affine.iter().enumerate() {
        if !value.is_finite() {
            return Err(RenderError::InvalidAffine { index, value });
        }
    }
    let [cx, cy] = center_of_mass(motor);
    let [sx, sy, tx, ty] = *affine;
    let warped = motor
        .iter()
        .map(|stroke| {
            stroke
                .iter()
                .map(|traj| {
                    let mut out = traj.clone();
                    for mut row in out.rows_mut() {
                        row[0] = (row[0] - cx) * sx + cx + tx;
                        row[1] = (row[1] - cy) * sy + cy + ty;
                    }
                    out
                })
                .collect()
        })
        .collect();
    Ok(warped)
}

/// Mean of all trajectory points; the origin for an empty motor.
pub fn center_of_mass(motor: &Motor) -> [f64; 2] {
    let mut sum = [0.0; 2];
    let mut count = 0usize;
    for traj in motor.iter().flatten() {
        for row in traj.rows() {
            sum[0] += row[0];
            sum[1] += row[1];
            count += 1;
        }
    }
    if count == 0 {
        return [0.0, 0.0];
    }
    [sum[0] / count as f64, sum[1] / count as f64]
}
