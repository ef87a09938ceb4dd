//! Ink deposition, broadening and Gaussian blur on a pixel grid.
//!
//! Coordinates are image coordinates: `x` is the column, `y` the row, both
//! in pixel units with `(0, 0)` at the top-left pixel centre.
use crate::rendering::{Motor, RenderConfig};
use ndarray::{Array2, ArrayView2};

/// Deposit ink along every trajectory of `motor`.
///
/// Each segment is densified to roughly `config.ink_pp` points per pixel of
/// arc length; every point spreads one unit of ink bilinearly over its four
/// neighbouring pixels. Returns the ink grid and whether any point fell off
/// the page (such points deposit nothing).
pub fn deposit(motor: &Motor, config: &RenderConfig) -> (Array2<f64>, bool) {
    let mut ink = Array2::zeros((config.height, config.width));
    let mut off_page = false;
    for traj in motor.iter().flatten() {
        let n = traj.nrows();
        if n == 0 {
            continue;
        }
        off_page |= !splat(&mut ink, traj[[0, 0]], traj[[0, 1]], 1.0);
        for i in 1..n {
            let (x0, y0) = (traj[[i - 1, 0]], traj[[i - 1, 1]]);
            let (x1, y1) = (traj[[i, 0]], traj[[i, 1]]);
            let dist = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
            let steps = (dist * config.ink_pp).ceil().max(1.0) as usize;
            let weight = dist * config.ink_pp / steps as f64;
            for s in 1..=steps {
                let frac = s as f64 / steps as f64;
                let x = x0 + frac * (x1 - x0);
                let y = y0 + frac * (y1 - y0);
                off_page |= !splat(&mut ink, x, y, weight.min(1.0));
            }
        }
    }
    (ink, off_page)
}

/// Convolve with the 3×3 broadening kernel controlled by `a ∈ [0, 1)`.
///
/// The kernel keeps `1 - a` of the mass at the centre and spreads `a` over the
/// eight neighbours (edge neighbours twice the weight of corners).
pub fn broaden(img: ArrayView2<'_, f64>, a: f64) -> Array2<f64> {
    let kernel = [
        [a / 12.0, a / 6.0, a / 12.0],
        [a / 6.0, 1.0 - a, a / 6.0],
        [a / 12.0, a / 6.0, a / 12.0],
    ];
    let (h, w) = img.dim();
    let mut out = Array2::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let mut acc = 0.0;
            for (dr, krow) in kernel.iter().enumerate() {
                for (dc, k) in krow.iter().enumerate() {
                    let rr = r as isize + dr as isize - 1;
                    let cc = c as isize + dc as isize - 1;
                    if rr >= 0 && cc >= 0 && (rr as usize) < h && (cc as usize) < w {
                        acc += k * img[[rr as usize, cc as usize]];
                    }
                }
            }
            out[[r, c]] = acc;
        }
    }
    out
}

/// Separable Gaussian blur with zero padding; `sigma <= 0` returns a copy.
pub fn gaussian_blur(img: ArrayView2<'_, f64>, sigma: f64) -> Array2<f64> {
    if sigma <= 0.0 {
        return img.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let (h, w) = img.dim();

    let mut rows_pass = Array2::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let cc = c as isize + k as isize - radius;
                if cc >= 0 && (cc as usize) < w {
                    acc += weight * img[[r, cc as usize]];
                }
            }
            rows_pass[[r, c]] = acc;
        }
    }

    let mut out = Array2::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let rr = r as isize + k as isize - radius;
                if rr >= 0 && (rr as usize) < h {
                    acc += weight * rows_pass[[rr as usize, c]];
                }
            }
            out[[r, c]] = acc;
        }
    }
    out
}

// ---- Helper methods ----

/// Spread `amount` of ink bilinearly around `(x, y)`. Returns `false` when
/// the point lies outside the page.
fn splat(ink: &mut Array2<f64>, x: f64, y: f64, amount: f64) -> bool {
    let (h, w) = ink.dim();
    if !(x >= 0.0 && y >= 0.0 && x <= (w - 1) as f64 && y <= (h - 1) as f64) {
        return false;
    }
    let c0 = x.floor() as usize;
    let r0 = y.floor() as usize;
    let fx = x - c0 as f64;
    let fy = y - r0 as f64;
    let c1 = (c0 + 1).min(w - 1);
    let r1 = (r0 + 1).min(h - 1);
    ink[[r0, c0]] += amount * (1.0 - fx) * (1.0 - fy);
    ink[[r0, c1]] += amount * fx * (1.0 - fy);
    ink[[r1, c0]] += amount * (1.0 - fx) * fy;
    ink[[r1, c1]] += amount * fx * fy;
    true
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (3.0 * sigma).ceil().max(1.0) as isize;
    let mut kernel: Vec<f64> =
        (-radius..=radius).map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp()).collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= total);
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Mass bookkeeping of deposition, broadening and blur, and off-page
    // detection. Probability shaping lives in `rendering::apply_render`.
    // -------------------------------------------------------------------------

    fn small_config() -> RenderConfig {
        RenderConfig::new(20, 20, 10, 2.0, 0.5, 6.0).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Bilinear splatting conserves ink for on-page points.
    //
    // Given
    // -----
    // - A single-point trajectory at a fractional location.
    //
    // Expect
    // ------
    // - Total ink equals one unit and the page flag stays clear.
    fn single_point_deposits_one_unit() {
        let motor: Motor = vec![vec![array![[4.25, 7.5]]]];

        let (ink, off_page) = deposit(&motor, &small_config());

        assert!(!off_page);
        assert!((ink.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Points outside the canvas are flagged and deposit nothing.
    //
    // Given
    // -----
    // - A trajectory starting on the page and ending far off it.
    //
    // Expect
    // ------
    // - `off_page == true`.
    fn off_page_points_are_flagged() {
        let motor: Motor = vec![vec![array![[5.0, 5.0], [50.0, 5.0]]]];

        let (_, off_page) = deposit(&motor, &small_config());

        assert!(off_page);
    }

    #[test]
    // Purpose
    // -------
    // Interior broadening and blurring preserve total mass.
    //
    // Given
    // -----
    // - A single unit of ink in the middle of a 21×21 grid.
    //
    // Expect
    // ------
    // - Sums after `broaden` and `gaussian_blur` stay at 1.
    fn broaden_and_blur_preserve_interior_mass() {
        let mut img = Array2::zeros((21, 21));
        img[[10, 10]] = 1.0;

        let broad = broaden(img.view(), 0.5);
        let blurred = gaussian_blur(broad.view(), 1.0);

        assert!((broad.sum() - 1.0).abs() < 1e-12);
        assert!((blurred.sum() - 1.0).abs() < 1e-9);
        assert!(blurred[[10, 10]] < broad[[10, 10]]);
    }
}
