//! Clamped uniform cubic B-splines for sub-stroke trajectories.
//!
//! Control points are padded by repeating the first and last point twice,
//! which makes the curve start exactly at the first control point and end
//! exactly at the last one. The curve parameter is normalized to `t ∈ [0, 1]`.
use crate::rendering::errors::{RenderError, RenderResult};
use ndarray::{Array2, ArrayView2};

/// Evaluate the spline defined by `cpts` (`ncpt × 2`) at `t ∈ [0, 1]`.
///
/// Values of `t` outside `[0, 1]` are clamped.
pub fn eval(cpts: ArrayView2<'_, f64>, t: f64) -> RenderResult<[f64; 2]> {
    check_control_points(cpts)?;
    Ok(eval_unchecked(cpts, t))
}

/// Sample `n` points of the spline at evenly spaced parameters, endpoints
/// included.
///
/// # Errors
/// - [`RenderError::InvalidControlPoints`] if `cpts` is not `(ncpt >= 2, 2)`.
/// - [`RenderError::InvalidSplineSamples`] if `n < 2`.
pub fn sample_curve(cpts: ArrayView2<'_, f64>, n: usize) -> RenderResult<Array2<f64>> {
    check_control_points(cpts)?;
    if n < 2 {
        return Err(RenderError::InvalidSplineSamples { samples: n });
    }
    let mut out = Array2::zeros((n, 2));
    let denom = (n - 1) as f64;
    for (i, mut row) in out.rows_mut().into_iter().enumerate() {
        let [x, y] = eval_unchecked(cpts, i as f64 / denom);
        row[0] = x;
        row[1] = y;
    }
    Ok(out)
}

// ---- Helper methods ----

fn check_control_points(cpts: ArrayView2<'_, f64>) -> RenderResult<()> {
    let (rows, cols) = cpts.dim();
    if rows < 2 || cols != 2 {
        return Err(RenderError::InvalidControlPoints { rows, cols });
    }
    Ok(())
}

fn eval_unchecked(cpts: ArrayView2<'_, f64>, t: f64) -> [f64; 2] {
    let m = cpts.nrows();
    let segments = m + 1;
    let u = t.clamp(0.0, 1.0) * segments as f64;
    let seg = (u.floor() as usize).min(segments - 1);
    let l = u - seg as f64;
    let l2 = l * l;
    let l3 = l2 * l;
    let basis = [
        (1.0 - l).powi(3) / 6.0,
        (3.0 * l3 - 6.0 * l2 + 4.0) / 6.0,
        (-3.0 * l3 + 3.0 * l2 + 3.0 * l + 1.0) / 6.0,
        l3 / 6.0,
    ];
    let mut point = [0.0; 2];
    for (k, b) in basis.iter().enumerate() {
        let row = padded_index(seg + k, m);
        point[0] += b * cpts[[row, 0]];
        point[1] += b * cpts[[row, 1]];
    }
    point
}

/// Map an index into the padded sequence `[p0, p0, p0, p1, …, pm-1, pm-1, pm-1]`
/// back to a row of the original control points.
fn padded_index(k: usize, m: usize) -> usize {
    k.saturating_sub(2).min(m - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Endpoint interpolation, straight-line reproduction and input checks.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The clamped spline must start and end on the first/last control point.
    //
    // Given
    // -----
    // - Five control points on a zig-zag.
    //
    // Expect
    // ------
    // - `eval(0)` equals the first point and `eval(1)` the last.
    fn spline_interpolates_endpoints() {
        let cpts = array![[0.0, 0.0], [1.0, 2.0], [2.0, -1.0], [3.0, 1.5], [4.0, 0.5]];

        let start = eval(cpts.view(), 0.0).unwrap();
        let end = eval(cpts.view(), 1.0).unwrap();

        assert!((start[0] - 0.0).abs() < 1e-12 && (start[1] - 0.0).abs() < 1e-12);
        assert!((end[0] - 4.0).abs() < 1e-12 && (end[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Collinear control points must produce a curve on the same line.
    //
    // Given
    // -----
    // - Control points on y = 2x.
    //
    // Expect
    // ------
    // - Every sampled point satisfies y = 2x.
    fn collinear_control_points_give_a_straight_curve() {
        let cpts = array![[0.0, 0.0], [1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];

        let curve = sample_curve(cpts.view(), 25).unwrap();

        assert_eq!(curve.dim(), (25, 2));
        for row in curve.rows() {
            assert!((row[1] - 2.0 * row[0]).abs() < 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Reject control blocks with the wrong column count and too few samples.
    //
    // Given
    // -----
    // - A `(3, 3)` block and a valid block sampled with `n = 1`.
    //
    // Expect
    // ------
    // - `InvalidControlPoints` and `InvalidSplineSamples` respectively.
    fn invalid_inputs_are_rejected() {
        let bad = Array2::<f64>::zeros((3, 3));
        let good = Array2::<f64>::zeros((3, 2));

        assert_eq!(
            sample_curve(bad.view(), 10).unwrap_err(),
            RenderError::InvalidControlPoints { rows: 3, cols: 3 }
        );
        assert_eq!(
            sample_curve(good.view(), 1).unwrap_err(),
            RenderError::InvalidSplineSamples { samples: 1 }
        );
    }
}
