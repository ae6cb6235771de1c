//! orbfit-ic: OrbFit elements to barycentric equatorial initial conditions
//!
//! This crate reads the cartesian section of an OrbFit `fel`/`eq` file
//! (heliocentric ecliptic state, epoch and covariance), rotates it onto
//! equatorial axes, shifts it to the solar system barycenter using a JPL SPK
//! ephemeris, and writes the result as initial conditions for an N-body
//! integrator.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

pub mod constants;
pub mod coordinates;
pub mod elements;
pub mod framelib;
pub mod jplephem;
pub mod orbfit;
pub mod planetlib;
pub mod time;

// Re-export commonly used types
pub use coordinates::{Covariance, Frame, Origin, StateVector};
pub use elements::{Converter, InputFormat, ParsedElements};
pub use planetlib::{Ephemeris, FixedEphemeris, SpkEphemeris};
pub use time::{Epoch, TimeScale};

/// Main error type for the conversion pipeline
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("No valid elements in {0}: missing cartesian position and velocity section")]
    NoValidElements(String),

    #[error("Malformed line {line} ({reason}): {text:?}")]
    MalformedLine { line: usize, text: String, reason: String },

    #[error("Nothing to transform: no heliocentric ecliptic vector or covariance")]
    NothingToTransform,

    #[error("Nothing to save: no barycentric equatorial vector with an epoch")]
    NothingToSave,

    #[error("Heliocentric ecliptic vector has no epoch")]
    MissingEpoch,

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Expected {expected} frame, found {found}")]
    FrameMismatch { expected: Frame, found: Frame },

    #[error("Expected {expected} origin, found {found}")]
    OriginMismatch { expected: Origin, found: Origin },

    #[error("Unknown input format {0:?} (expected fel, eq or ele220)")]
    UnknownFormat(String),

    #[error("I/O error on {path:?}: {source}")]
    IoError { path: PathBuf, source: std::io::Error },

    #[error("Ephemeris error: {0}")]
    EphemerisError(#[from] jplephem::JplephemError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Default directory for ephemeris kernels
pub fn default_data_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".cache").join("orbfit-ic")
}

/// Entry point for loading ephemerides and element files
pub struct Loader {
    data_dir: Option<PathBuf>,
}

impl Loader {
    /// Create a new loader with default data directory
    pub fn new() -> Self {
        Self { data_dir: None }
    }

    /// Set a custom data directory
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Where `name` is looked for: as given if it exists or is absolute,
    /// otherwise inside the data directory
    pub fn resolve<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() || name.exists() {
            name.to_path_buf()
        } else {
            self.data_dir().join(name)
        }
    }

    /// Open an SPK kernel, e.g. `"de440s.bsp"`
    pub fn load_ephemeris<P: AsRef<Path>>(&self, name: P) -> Result<SpkEphemeris> {
        let path = self.resolve(name);
        debug!("Loading ephemeris from {}", path.display());
        Ok(SpkEphemeris::open(path)?)
    }

    /// Parse and transform an element file
    pub fn load_elements<P: AsRef<Path>>(
        &self,
        path: P,
        format: InputFormat,
        ephemeris: &dyn Ephemeris,
    ) -> Result<ParsedElements> {
        ParsedElements::from_file(path, format, ephemeris)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
