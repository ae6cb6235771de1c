//! Failures while opening a kernel or evaluating one of its segments

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JplephemError {
    #[error("Cannot read kernel {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// Kernel is not a DAF/SPK file, or its records are inconsistent
    #[error("Invalid kernel: {0}")]
    InvalidFormat(String),

    #[error("No segment for target {target} relative to center {center}")]
    SegmentNotFound { center: i32, target: i32 },

    /// Only Chebyshev types 2 and 3 are evaluated
    #[error("SPK data type {0} is not supported")]
    UnsupportedDataType(i32),

    #[error("JD {jd} TDB is outside segment coverage JD {start_jd}..{end_jd}")]
    OutOfRange { jd: f64, start_jd: f64, end_jd: f64 },
}

impl JplephemError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        JplephemError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, JplephemError>;
