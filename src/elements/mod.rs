//! Parsed and transformed elements of a single object
//!
//! [`ParsedElements`] moves through three stages. It starts empty, is filled
//! with heliocentric ecliptic data (from an OrbFit file, the placeholder
//! fixture, or directly), and is then transformed to barycentric equatorial
//! data ready to be written for the integrator.
//!
//! ```rust,no_run
//! use orbfit_ic::elements::{InputFormat, ParsedElements};
//! use orbfit_ic::planetlib::SpkEphemeris;
//!
//! let ephemeris = SpkEphemeris::open("de430.bsp")?;
//! let elements = ParsedElements::from_file("2022AA.eq", InputFormat::Eq, &ephemeris)?;
//! elements.save_elements("holman_ic")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod converter;
pub mod fixtures;
pub mod writer;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::coordinates::{Covariance, StateVector};
use crate::framelib::{ecliptic_to_equatorial, helio_to_bary, rotate_covariance, Direction};
use crate::orbfit::{parse_orbfit_file, parse_orbfit_str, OrbfitElements};
use crate::planetlib::Ephemeris;
use crate::time::Epoch;
use crate::{ConversionError, Result};

pub use converter::Converter;
pub use writer::{format_component, write_initial_conditions, IntegratorHeader, DEFAULT_OUTPUT};

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// OrbFit `.fel` output
    Fel,
    /// OrbFit `.eq` output
    Eq,
    /// MPC ele220 line; not parsed, placeholder data only
    Ele220,
}

impl InputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            InputFormat::Fel => "fel",
            InputFormat::Eq => "eq",
            InputFormat::Ele220 => "ele220",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fel" => Ok(InputFormat::Fel),
            "eq" => Ok(InputFormat::Eq),
            "ele220" => Ok(InputFormat::Ele220),
            other => Err(ConversionError::UnknownFormat(other.to_string())),
        }
    }
}

/// How far through the pipeline a [`ParsedElements`] has got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Empty,
    Parsed,
    Transformed,
}

/// Elements of one object, before and after the frame conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedElements {
    /// Where the elements came from
    pub source: Option<String>,
    /// Epoch of the state vectors
    pub epoch: Option<Epoch>,
    pub helio_ecl_vec: Option<StateVector>,
    pub helio_ecl_cov: Option<Covariance>,
    pub bary_eq_vec: Option<StateVector>,
    pub bary_eq_cov: Option<Covariance>,
}

impl ParsedElements {
    /// Empty elements, to be filled in directly
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` in the given format and transform to barycentric
    /// equatorial
    pub fn from_file<P: AsRef<Path>>(path: P, format: InputFormat, ephemeris: &dyn Ephemeris) -> Result<Self> {
        let path = path.as_ref();
        let mut elements = match format {
            InputFormat::Fel | InputFormat::Eq => Self::from_orbfit(parse_orbfit_file(path)?),
            InputFormat::Ele220 => {
                // Still insist the file is there
                fs::metadata(path).map_err(|source| ConversionError::IoError {
                    path: path.to_path_buf(),
                    source,
                })?;
                warn!(
                    "ele220 input is not parsed yet; using placeholder elements instead of {}",
                    path.display()
                );
                Self::placeholder_fixture(false)
            }
        };
        elements.source = Some(path.display().to_string());
        elements.make_bary_equatorial(ephemeris)?;
        Ok(elements)
    }

    /// Parse OrbFit text and transform to barycentric equatorial
    pub fn from_orbfit_text(text: &str, source_name: &str, ephemeris: &dyn Ephemeris) -> Result<Self> {
        let mut elements = Self::from_orbfit(parse_orbfit_str(text, source_name)?);
        elements.source = Some(source_name.to_string());
        elements.make_bary_equatorial(ephemeris)?;
        Ok(elements)
    }

    /// Untransformed elements from a parsed OrbFit section
    pub fn from_orbfit(parsed: OrbfitElements) -> Self {
        Self {
            source: None,
            epoch: Some(parsed.epoch),
            helio_ecl_vec: Some(parsed.state),
            helio_ecl_cov: parsed.covariance,
            bary_eq_vec: None,
            bary_eq_cov: None,
        }
    }

    pub fn stage(&self) -> Stage {
        if self.bary_eq_vec.is_some() || self.bary_eq_cov.is_some() {
            Stage::Transformed
        } else if self.helio_ecl_vec.is_some() || self.helio_ecl_cov.is_some() {
            Stage::Parsed
        } else {
            Stage::Empty
        }
    }

    /// Rotate and translate the heliocentric ecliptic vector, and rotate the
    /// covariance, into barycentric equatorial. Nothing is stored unless
    /// every step succeeds.
    pub fn make_bary_equatorial(&mut self, ephemeris: &dyn Ephemeris) -> Result<()> {
        if self.helio_ecl_vec.is_none() && self.helio_ecl_cov.is_none() {
            return Err(ConversionError::NothingToTransform);
        }

        let bary_vec = match &self.helio_ecl_vec {
            Some(vec) => {
                let epoch = self.epoch.ok_or(ConversionError::MissingEpoch)?;
                let equatorial = ecliptic_to_equatorial(vec)?;
                Some(helio_to_bary(&equatorial, &epoch, ephemeris)?)
            }
            None => None,
        };
        let bary_cov = match &self.helio_ecl_cov {
            Some(cov) => Some(rotate_covariance(cov, Direction::Forward)?),
            None => None,
        };

        self.bary_eq_vec = bary_vec;
        self.bary_eq_cov = bary_cov;
        info!(
            "Transformed to barycentric equatorial using {} (vector {}, covariance {})",
            ephemeris.describe(),
            self.bary_eq_vec.is_some(),
            self.bary_eq_cov.is_some()
        );
        Ok(())
    }

    /// Write the barycentric equatorial state to `path` with the default
    /// integrator header, replacing any existing file
    pub fn save_elements<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_elements_with(path, &IntegratorHeader::default())
    }

    pub fn save_elements_with<P: AsRef<Path>>(&self, path: P, header: &IntegratorHeader) -> Result<()> {
        let path = path.as_ref();
        let (state, epoch) = match (&self.bary_eq_vec, &self.epoch) {
            (Some(state), Some(epoch)) => (state, epoch),
            _ => return Err(ConversionError::NothingToSave),
        };
        if !state.has_velocity() {
            return Err(ConversionError::InvalidShape(format!(
                "initial conditions need position and velocity, state has {} components",
                state.len()
            )));
        }

        // Format in memory so a failure leaves no partial file
        let mut buffer = Vec::new();
        write_initial_conditions(&mut buffer, epoch.tdb_jd(), state, header).map_err(|source| {
            ConversionError::IoError {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, buffer).map_err(|source| ConversionError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved initial conditions to {}", path.display());
        Ok(())
    }

    /// Pretty JSON of the elements and their stage
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Report<'a> {
            stage: Stage,
            epoch_tdb_jd: Option<f64>,
            #[serde(flatten)]
            elements: &'a ParsedElements,
        }

        let report = Report {
            stage: self.stage(),
            epoch_tdb_jd: self.epoch.map(|e| e.tdb_jd()),
            elements: self,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AU_KM;
    use crate::coordinates::{Frame, Origin};
    use crate::framelib::rotation_matrix;
    use crate::planetlib::FixedEphemeris;
    use crate::time::TimeScale;
    use crate::jplephem::errors::Result as EphemerisResult;
    use crate::planetlib::BodyState;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix6, Vector3, Vector6};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FEL: &str = "\
! Cartesian position and velocity vectors
 CAR   1.0 2.0 3.0 0.1 0.2 0.3
 MJD     58849.0 TDT
";

    fn ephemeris() -> FixedEphemeris {
        FixedEphemeris::new(Vector3::new(AU_KM, 0.0, -AU_KM), Vector3::new(0.0, AU_KM, 0.0))
    }

    /// Fixed ephemeris that counts its lookups
    struct CountingEphemeris {
        inner: FixedEphemeris,
        lookups: AtomicUsize,
    }

    impl CountingEphemeris {
        fn new() -> Self {
            Self {
                inner: ephemeris(),
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl Ephemeris for CountingEphemeris {
        fn sun_barycentric(&self, epoch: &Epoch) -> EphemerisResult<BodyState> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.sun_barycentric(epoch)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    #[test]
    fn test_stages() {
        let mut elements = ParsedElements::new();
        assert_eq!(elements.stage(), Stage::Empty);

        elements.helio_ecl_vec = Some(StateVector::new(
            Vector6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3),
            Frame::Ecliptic,
            Origin::Heliocentric,
        ));
        elements.epoch = Some(Epoch::from_mjd(58849.0, TimeScale::Tt));
        assert_eq!(elements.stage(), Stage::Parsed);

        elements.make_bary_equatorial(&ephemeris()).unwrap();
        assert_eq!(elements.stage(), Stage::Transformed);
        assert!(elements.bary_eq_cov.is_none());
    }

    #[test]
    fn test_transform_matches_manual_composition() {
        let elements = ParsedElements::from_orbfit_text(FEL, "test.fel", &ephemeris()).unwrap();
        let r = rotation_matrix(Direction::Forward);
        let p = r * Vector3::new(1.0, 2.0, 3.0) + Vector3::new(1.0, 0.0, -1.0);
        let v = r * Vector3::new(0.1, 0.2, 0.3) + Vector3::new(0.0, 1.0, 0.0);

        let bary = elements.bary_eq_vec.unwrap();
        assert_eq!(bary.frame, Frame::Equatorial);
        assert_eq!(bary.origin, Origin::Barycentric);
        assert_relative_eq!(bary.position(), p, epsilon = 1e-14);
        assert_relative_eq!(bary.velocity().unwrap(), v, epsilon = 1e-14);
        assert_eq!(elements.source.as_deref(), Some("test.fel"));
    }

    #[test]
    fn test_nothing_to_transform() {
        let mut elements = ParsedElements::new();
        assert!(matches!(
            elements.make_bary_equatorial(&ephemeris()),
            Err(ConversionError::NothingToTransform)
        ));
    }

    #[test]
    fn test_missing_epoch_leaves_no_partial_state() {
        let mut elements = ParsedElements::new();
        elements.helio_ecl_vec = Some(StateVector::new(Vector6::zeros(), Frame::Ecliptic, Origin::Heliocentric));
        elements.helio_ecl_cov = Some(Covariance::new(Matrix6::identity(), Frame::Ecliptic));

        assert!(matches!(
            elements.make_bary_equatorial(&ephemeris()),
            Err(ConversionError::MissingEpoch)
        ));
        assert!(elements.bary_eq_vec.is_none());
        assert!(elements.bary_eq_cov.is_none());
        assert_eq!(elements.stage(), Stage::Parsed);
    }

    #[test]
    fn test_covariance_only() {
        let mut elements = ParsedElements::new();
        elements.helio_ecl_cov = Some(Covariance::new(Matrix6::from_element(0.01), Frame::Ecliptic));
        elements.make_bary_equatorial(&ephemeris()).unwrap();
        let cov = elements.bary_eq_cov.unwrap();
        assert_eq!(cov.frame, Frame::Equatorial);
        assert!(cov.is_symmetric(1e-15));
        assert!(elements.bary_eq_vec.is_none());
    }

    #[test]
    fn test_save_requires_transformed_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holman_ic");
        let elements = ParsedElements::new();
        assert!(matches!(
            elements.save_elements(&path),
            Err(ConversionError::NothingToSave)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_elements() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holman_ic");
        let elements = ParsedElements::from_orbfit_text(FEL, "test.fel", &ephemeris()).unwrap();
        elements.save_elements(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        let tdb = elements.epoch.unwrap().tdb_jd();
        assert_eq!(lines[0], format!("tstart {}", tdb));
        assert_eq!(lines[4], "state");
        assert_eq!(lines[5].split_whitespace().count(), 3);
        assert_eq!(lines[6].split_whitespace().count(), 3);

        let written: Vec<f64> = lines[5..]
            .iter()
            .flat_map(|l| l.split_whitespace())
            .map(|f| f.parse().unwrap())
            .collect();
        for (w, v) in written.iter().zip(elements.bary_eq_vec.unwrap().as_slice()) {
            assert_relative_eq!(w, v, max_relative = 1e-15);
        }
    }

    #[test]
    fn test_save_rejects_position_only_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holman_ic");
        let mut elements = ParsedElements::new();
        elements.helio_ecl_vec = Some(StateVector::from_position(
            Vector3::new(1.0, 2.0, 3.0),
            Frame::Ecliptic,
            Origin::Heliocentric,
        ));
        elements.epoch = Some(Epoch::from_mjd(58849.0, TimeScale::Tt));
        elements.make_bary_equatorial(&ephemeris()).unwrap();
        assert_eq!(elements.bary_eq_vec.unwrap().len(), 3);

        assert!(matches!(
            elements.save_elements(&path),
            Err(ConversionError::InvalidShape(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_rerun_drops_cleared_results() {
        let mut elements = ParsedElements::from_orbfit_text(FEL, "test.fel", &ephemeris()).unwrap();
        elements.helio_ecl_cov = Some(Covariance::new(Matrix6::identity(), Frame::Ecliptic));
        elements.make_bary_equatorial(&ephemeris()).unwrap();
        assert!(elements.bary_eq_cov.is_some());

        elements.helio_ecl_cov = None;
        elements.make_bary_equatorial(&ephemeris()).unwrap();
        assert!(elements.bary_eq_cov.is_none());
        assert!(elements.bary_eq_vec.is_some());

        elements.helio_ecl_vec = None;
        elements.helio_ecl_cov = Some(Covariance::new(Matrix6::identity(), Frame::Ecliptic));
        elements.make_bary_equatorial(&ephemeris()).unwrap();
        assert!(elements.bary_eq_vec.is_none());
        assert!(elements.bary_eq_cov.is_some());
    }

    #[test]
    fn test_ele220_transforms_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object.ele220");
        fs::write(&path, "unparsed\n").unwrap();
        let ephem = CountingEphemeris::new();

        let elements = ParsedElements::from_file(&path, InputFormat::Ele220, &ephem).unwrap();
        assert_eq!(elements.stage(), Stage::Transformed);
        assert_eq!(ephem.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(elements.source.as_deref(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_input_format_parse() {
        assert_eq!("fel".parse::<InputFormat>().unwrap(), InputFormat::Fel);
        assert_eq!("EQ".parse::<InputFormat>().unwrap(), InputFormat::Eq);
        assert_eq!("ele220".parse::<InputFormat>().unwrap(), InputFormat::Ele220);
        assert!(matches!(
            "csv".parse::<InputFormat>(),
            Err(ConversionError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_json_report() {
        let elements = ParsedElements::from_orbfit_text(FEL, "test.fel", &ephemeris()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&elements.to_json().unwrap()).unwrap();
        assert_eq!(json["stage"], "transformed");
        assert_eq!(json["source"], "test.fel");
        assert_eq!(json["helio_ecl_vec"]["frame"], "ecliptic");
        assert_eq!(json["bary_eq_vec"]["origin"], "barycentric");
        assert!(json["bary_eq_cov"].is_null());
    }
}
