//! On-disk layout of a primitive library.
//!
//! A library directory holds a single `library.json` whose fields mirror
//! [`LibraryFile`]. Reading performs no validation beyond JSON decoding;
//! [`Library::from_file`](crate::library::Library::from_file) validates.
use crate::library::{
    Canvas, N_RELATION_TYPES,
    errors::{LibraryError, LibraryResult},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// File name of the library inside its directory.
pub const LIBRARY_FILE_NAME: &str = "library.json";

/// Raw tables as stored in `library.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryFile {
    /// Control points per sub-stroke.
    pub ncpt: usize,
    /// Per primitive: flattened `ncpt × 2` mean.
    pub shape_mean: Vec<Vec<f64>>,
    /// Per primitive: `2·ncpt × 2·ncpt` covariance rows.
    pub shape_cov: Vec<Vec<Vec<f64>>>,
    /// Per primitive gamma shape of the inverse scale.
    pub scale_shape: Vec<f64>,
    /// Per primitive gamma rate of the inverse scale.
    pub scale_rate: Vec<f64>,
    /// Log-probability of each primitive starting a stroke.
    pub log_start: Vec<f64>,
    /// Row-stochastic transition matrix between primitives.
    pub transitions: Vec<Vec<f64>>,
    pub stroke_count_pmf: Vec<f64>,
    pub substroke_count_pmf: Vec<Vec<f64>>,
    /// Independent, start, end, mid.
    pub relation_mixprobs: [f64; N_RELATION_TYPES],
    pub canvas: Canvas,
}

impl LibraryFile {
    /// Read `<dir>/library.json`.
    pub fn read(dir: impl AsRef<Path>) -> LibraryResult<Self> {
        let path = dir.as_ref().join(LIBRARY_FILE_NAME);
        let text = fs::read_to_string(&path).map_err(|e| LibraryError::Io {
            path: path.display().to_string(),
            text: e.to_string(),
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write `<dir>/library.json`, creating `dir` if needed.
    pub fn write(&self, dir: impl AsRef<Path>) -> LibraryResult<()> {
        let dir = dir.as_ref();
        let path = dir.join(LIBRARY_FILE_NAME);
        let io_err = |e: std::io::Error| LibraryError::Io {
            path: path.display().to_string(),
            text: e.to_string(),
        };
        fs::create_dir_all(dir).map_err(io_err)?;
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Library;

    #[test]
    // Purpose
    // -------
    // A saved library loads back to the same validated library.
    //
    // Given
    // -----
    // - A synthetic 4-primitive library saved into a temporary directory.
    //
    // Expect
    // ------
    // - `library.json` exists and `Library::load` reproduces every prior.
    fn save_then_load_restores_library() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let lib = Library::synthetic(4, 9).unwrap();

        // Act
        lib.save(dir.path()).unwrap();
        let back = Library::load(dir.path()).unwrap();

        // Assert
        assert!(dir.path().join(LIBRARY_FILE_NAME).exists());
        assert_eq!(back.n_primitives(), 4);
        for id in 0..4 {
            assert_eq!(back.shape_prior(id), lib.shape_prior(id));
            assert_eq!(back.scale_prior(id), lib.scale_prior(id));
        }
        assert_eq!(back.canvas(), lib.canvas());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        match Library::load(dir.path()) {
            Err(LibraryError::Io { path, .. }) => assert!(path.ends_with(LIBRARY_FILE_NAME)),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LIBRARY_FILE_NAME), "{ \"ncpt\": 5 ").unwrap();
        assert!(matches!(Library::load(dir.path()), Err(LibraryError::Parse { .. })));
    }
}
