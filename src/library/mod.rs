//! library — learned statistics of the stroke primitives.
//!
//! Purpose
//! -------
//! Hold everything the character prior needs to know about primitives:
//! per-primitive shape and inverse-scale priors, the Markov chain over
//! primitive ids, stroke-count and sub-stroke-count distributions, relation
//! mixture weights and the canvas region for independent strokes. A
//! [`Library`] is loaded once per run and is read-only afterwards.
//!
//! Key behaviors
//! -------------
//! - [`Library::load`] reads `<dir>/library.json` ([`file`]) and validates
//!   every table before the library can be used.
//! - [`Library::synthetic`] builds a deterministic, seeded library so the
//!   crate runs and tests without external data ([`synthetic`]).
//! - Priors are exposed as [`ShapePrior`] / [`ScalePrior`] objects that own
//!   their precomputed factorizations.
//!
//! Invariants & assumptions
//! ------------------------
//! - `n_primitives > 0` and `ncpt >= 2`.
//! - Every probability table is non-negative and sums to one within `1e-6`.
//! - Every shape covariance is symmetric positive definite.
//! - Primitive ids are 0-based indices into the tables.
//!
//! Conventions
//! -----------
//! - Shape vectors flatten `ncpt × 2` control points row-major.
//! - Sub-stroke-count rows are indexed by `min(n_strokes − 1, last_row)`;
//!   column `j` is the probability of `j + 1` sub-strokes.
//! - Stroke-count entry `k` is the probability of `k + 1` strokes.
//!
//! Downstream usage
//! ----------------
//! - `model::type_dist::TypeDistribution` borrows a `&Library` for sampling
//!   and scoring; `model::token_dist` reads the canvas.
//!
//! Testing notes
//! -------------
//! - Unit tests cover table validation and the JSON round-trip; prior
//!   densities are tested in [`priors`].
pub mod errors;
pub mod file;
pub mod priors;
pub mod synthetic;

use crate::library::{
    errors::{LibraryError, LibraryResult},
    file::LibraryFile,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

pub use self::priors::{ScalePrior, ShapePrior};

/// Tolerance for probability tables summing to one.
const PMF_TOL: f64 = 1e-6;

/// Relation mixture order: independent, start, end, mid.
pub const N_RELATION_TYPES: usize = 4;

/// Axis-aligned region (pixels) where independent strokes may start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub xlim: [f64; 2],
    pub ylim: [f64; 2],
}

impl Canvas {
    pub fn validate(&self) -> LibraryResult<()> {
        for [min, max] in [self.xlim, self.ylim] {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(LibraryError::InvalidCanvas { min, max });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    ncpt: usize,
    shape_priors: Vec<ShapePrior>,
    scale_priors: Vec<ScalePrior>,
    start_probs: Array1<f64>,
    transitions: Array2<f64>,
    stroke_count_pmf: Array1<f64>,
    substroke_count_pmf: Array2<f64>,
    relation_mixprobs: [f64; N_RELATION_TYPES],
    canvas: Canvas,
}

impl Library {
    /// Load and validate `<dir>/library.json`.
    ///
    /// # Errors
    /// - [`LibraryError::Io`] / [`LibraryError::Parse`] if the file cannot be
    ///   read or decoded.
    /// - Any validation error of [`Library::from_file`].
    pub fn load(dir: impl AsRef<std::path::Path>) -> LibraryResult<Self> {
        Self::from_file(LibraryFile::read(dir)?)
    }

    /// Write the library to `<dir>/library.json`.
    pub fn save(&self, dir: impl AsRef<std::path::Path>) -> LibraryResult<()> {
        self.to_file().write(dir)
    }

    /// Validate raw tables and precompute the priors.
    ///
    /// # Errors
    /// - [`LibraryError::EmptyLibrary`], [`LibraryError::InvalidControlPointCount`].
    /// - [`LibraryError::DimMismatch`] for tables of the wrong size.
    /// - [`LibraryError::NonFiniteStat`], [`LibraryError::InvalidPmf`],
    ///   [`LibraryError::InvalidCanvas`] for malformed values.
    /// - Prior construction errors ([`LibraryError::NotPositiveDefinite`],
    ///   [`LibraryError::InvalidGammaParam`]).
    pub fn from_file(raw: LibraryFile) -> LibraryResult<Self> {
        let n = raw.shape_mean.len();
        if n == 0 {
            return Err(LibraryError::EmptyLibrary);
        }
        if raw.ncpt < 2 {
            return Err(LibraryError::InvalidControlPointCount { ncpt: raw.ncpt });
        }
        let d = raw.ncpt * 2;
        check_len("shape_cov", n, raw.shape_cov.len())?;
        check_len("scale_shape", n, raw.scale_shape.len())?;
        check_len("scale_rate", n, raw.scale_rate.len())?;
        check_len("log_start", n, raw.log_start.len())?;
        check_len("transitions", n, raw.transitions.len())?;

        let mut shape_priors = Vec::with_capacity(n);
        let mut scale_priors = Vec::with_capacity(n);
        for id in 0..n {
            check_len("shape_mean", d, raw.shape_mean[id].len())?;
            let cov = to_matrix("shape_cov", &raw.shape_cov[id], d, d)?;
            let mean = Array1::from(raw.shape_mean[id].clone());
            shape_priors.push(ShapePrior::new(id, mean, &cov)?);
            scale_priors.push(ScalePrior::new(id, raw.scale_shape[id], raw.scale_rate[id])?);
        }

        let start_probs = Array1::from(raw.log_start.iter().map(|lp| lp.exp()).collect::<Vec<_>>());
        check_pmf("log_start", 0, start_probs.iter().copied())?;

        let transitions = to_matrix("transitions", &raw.transitions, n, n)?;
        for (row, probs) in transitions.rows().into_iter().enumerate() {
            check_pmf("transitions", row, probs.iter().copied())?;
        }

        if raw.stroke_count_pmf.is_empty() {
            return Err(LibraryError::DimMismatch {
                field: "stroke_count_pmf",
                expected: 1,
                found: 0,
            });
        }
        check_pmf("stroke_count_pmf", 0, raw.stroke_count_pmf.iter().copied())?;
        let stroke_count_pmf = Array1::from(raw.stroke_count_pmf);

        let n_rows = raw.substroke_count_pmf.len();
        let n_cols = raw.substroke_count_pmf.first().map_or(0, |r| r.len());
        if n_rows == 0 || n_cols == 0 {
            return Err(LibraryError::DimMismatch {
                field: "substroke_count_pmf",
                expected: 1,
                found: 0,
            });
        }
        let substroke_count_pmf =
            to_matrix("substroke_count_pmf", &raw.substroke_count_pmf, n_rows, n_cols)?;
        for (row, probs) in substroke_count_pmf.rows().into_iter().enumerate() {
            check_pmf("substroke_count_pmf", row, probs.iter().copied())?;
        }

        check_pmf("relation_mixprobs", 0, raw.relation_mixprobs.iter().copied())?;
        raw.canvas.validate()?;

        Ok(Self {
            ncpt: raw.ncpt,
            shape_priors,
            scale_priors,
            start_probs,
            transitions,
            stroke_count_pmf,
            substroke_count_pmf,
            relation_mixprobs: raw.relation_mixprobs,
            canvas: raw.canvas,
        })
    }

    /// Export the raw tables.
    pub fn to_file(&self) -> LibraryFile {
        let rows = |m: &Array2<f64>| m.rows().into_iter().map(|r| r.to_vec()).collect::<Vec<_>>();
        LibraryFile {
            ncpt: self.ncpt,
            shape_mean: self.shape_priors.iter().map(|p| p.mean().to_vec()).collect(),
            shape_cov: self.shape_priors.iter().map(|p| rows(p.cov())).collect(),
            scale_shape: self.scale_priors.iter().map(|p| p.shape()).collect(),
            scale_rate: self.scale_priors.iter().map(|p| p.rate()).collect(),
            log_start: self.start_probs.iter().map(|p| p.ln()).collect(),
            transitions: rows(&self.transitions),
            stroke_count_pmf: self.stroke_count_pmf.to_vec(),
            substroke_count_pmf: rows(&self.substroke_count_pmf),
            relation_mixprobs: self.relation_mixprobs,
            canvas: self.canvas,
        }
    }

    pub fn n_primitives(&self) -> usize {
        self.shape_priors.len()
    }

    /// Control points per sub-stroke.
    pub fn ncpt(&self) -> usize {
        self.ncpt
    }

    pub fn shape_prior(&self, id: usize) -> Option<&ShapePrior> {
        self.shape_priors.get(id)
    }

    pub fn scale_prior(&self, id: usize) -> Option<&ScalePrior> {
        self.scale_priors.get(id)
    }

    /// Probability of each primitive starting a stroke.
    pub fn start_probs(&self) -> &Array1<f64> {
        &self.start_probs
    }

    /// Transition probabilities out of primitive `id`.
    pub fn transition_row(&self, id: usize) -> Option<ndarray::ArrayView1<'_, f64>> {
        (id < self.n_primitives()).then(|| self.transitions.row(id))
    }

    pub fn stroke_count_pmf(&self) -> &Array1<f64> {
        &self.stroke_count_pmf
    }

    /// Sub-stroke-count distribution for a character with `n_strokes` strokes.
    pub fn substroke_count_row(&self, n_strokes: usize) -> ndarray::ArrayView1<'_, f64> {
        let last = self.substroke_count_pmf.nrows() - 1;
        self.substroke_count_pmf.row(n_strokes.saturating_sub(1).min(last))
    }

    pub fn relation_mixprobs(&self) -> &[f64; N_RELATION_TYPES] {
        &self.relation_mixprobs
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

// ---- Helper methods ----

fn check_len(field: &'static str, expected: usize, found: usize) -> LibraryResult<()> {
    if expected != found {
        return Err(LibraryError::DimMismatch { field, expected, found });
    }
    Ok(())
}

fn to_matrix(
    field: &'static str, rows: &[Vec<f64>], n_rows: usize, n_cols: usize,
) -> LibraryResult<Array2<f64>> {
    check_len(field, n_rows, rows.len())?;
    let mut out = Array2::zeros((n_rows, n_cols));
    for (i, row) in rows.iter().enumerate() {
        check_len(field, n_cols, row.len())?;
        for (j, &value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(LibraryError::NonFiniteStat { field, index: i * n_cols + j, value });
            }
            out[[i, j]] = value;
        }
    }
    Ok(out)
}

fn check_pmf(
    field: &'static str, row: usize, probs: impl Iterator<Item = f64>,
) -> LibraryResult<()> {
    let mut sum = 0.0;
    for p in probs {
        if !p.is_finite() || p < 0.0 {
            return Err(LibraryError::InvalidPmf { field, row, sum: p });
        }
        sum += p;
    }
    if (sum - 1.0).abs() > PMF_TOL {
        return Err(LibraryError::InvalidPmf { field, row, sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Validation of raw tables (sizes, pmfs, canvas).
    // - Row selection for sub-stroke counts.
    // - Export/import consistency.
    //
    // They intentionally DO NOT cover:
    // - Prior densities (see `priors`) or file I/O (see `file`).
    // -------------------------------------------------------------------------

    fn raw() -> LibraryFile {
        Library::synthetic(3, 5).unwrap().to_file()
    }

    #[test]
    // Purpose
    // -------
    // Exported tables rebuild an identical library.
    //
    // Given
    // -----
    // - A synthetic 3-primitive library.
    //
    // Expect
    // ------
    // - `from_file(to_file(lib))` has the same tables and priors (up to the
    //   exp/ln round trip of the start probabilities).
    fn export_then_import_preserves_tables() {
        let lib = Library::synthetic(3, 5).unwrap();

        let back = Library::from_file(lib.to_file()).unwrap();

        assert_eq!(back.n_primitives(), 3);
        assert_eq!(back.ncpt(), lib.ncpt());
        assert_eq!(back.shape_prior(1), lib.shape_prior(1));
        assert_eq!(back.scale_prior(2), lib.scale_prior(2));
        for (a, b) in back.start_probs().iter().zip(lib.start_probs().iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_and_mis_sized_tables_are_rejected() {
        let mut empty = raw();
        empty.shape_mean.clear();
        assert_eq!(Library::from_file(empty).unwrap_err(), LibraryError::EmptyLibrary);

        let mut short = raw();
        short.scale_rate.pop();
        assert_eq!(
            Library::from_file(short).unwrap_err(),
            LibraryError::DimMismatch { field: "scale_rate", expected: 3, found: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Probability tables must be distributions.
    //
    // Given
    // -----
    // - A transition row scaled by 2, and a negative relation weight.
    //
    // Expect
    // ------
    // - `InvalidPmf` naming the table and row.
    fn non_normalized_tables_are_rejected() {
        let mut doubled = raw();
        doubled.transitions[1].iter_mut().for_each(|p| *p *= 2.0);
        let mut negative = raw();
        negative.relation_mixprobs = [1.2, -0.2, 0.0, 0.0];

        assert!(matches!(
            Library::from_file(doubled),
            Err(LibraryError::InvalidPmf { field: "transitions", row: 1, .. })
        ));
        assert!(matches!(
            Library::from_file(negative),
            Err(LibraryError::InvalidPmf { field: "relation_mixprobs", .. })
        ));
    }

    #[test]
    fn substroke_rows_are_capped_at_the_last_row() {
        let lib = Library::synthetic(3, 5).unwrap();
        let last = lib.substroke_count_pmf.nrows() - 1;
        assert_eq!(lib.substroke_count_row(100), lib.substroke_count_pmf.row(last));
        assert_eq!(lib.substroke_count_row(1), lib.substroke_count_pmf.row(0));
    }

    #[test]
    fn inverted_canvas_is_rejected() {
        let mut bad = raw();
        bad.canvas.xlim = [80.0, 25.0];
        assert_eq!(
            Library::from_file(bad).unwrap_err(),
            LibraryError::InvalidCanvas { min: 80.0, max: 25.0 }
        );
    }
}
