//! Initial-conditions file for the integrator
//!
//! ```text
//! tstart 2458849.5
//! tstep +20.0
//! trange 600.
//! geocentric 0
//! state
//!  3.000000000000000e+00  2.000000000000000e+00  1.000000000000000e+00
//!  3.000000000000000e-01  2.000000000000000e-01  1.000000000000000e-01
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::coordinates::StateVector;
use crate::{ConversionError, Result};

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "holman_ic";

/// Minimum field width of a state component
const COMPONENT_WIDTH: usize = 18;

/// Integrator settings written ahead of the state
///
/// Values are kept as the literal text that goes into the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorHeader {
    pub tstep: String,
    pub trange: String,
    pub geocentric: u8,
}

impl Default for IntegratorHeader {
    fn default() -> Self {
        Self {
            tstep: "+20.0".to_string(),
            trange: "600.".to_string(),
            geocentric: 0,
        }
    }
}

impl IntegratorHeader {
    /// Load header settings from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConversionError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Format a component in C `% .15e` style: space or minus sign, 15 digits
/// after the point and an exponent of at least two digits
pub fn format_component(value: f64) -> String {
    let sign = if value.is_sign_negative() { '-' } else { ' ' };
    if !value.is_finite() {
        let word = if value.is_nan() { "nan" } else { "inf" };
        let sign = if value.is_nan() { ' ' } else { sign };
        return format!("{:>width$}", format!("{}{}", sign, word), width = COMPONENT_WIDTH);
    }

    let formatted = format!("{:.15e}", value.abs());
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    let text = format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exponent.abs());
    format!("{:>width$}", text, width = COMPONENT_WIDTH)
}

/// Shortest text that reads back as the same Julian date, always with a
/// decimal point
pub fn format_julian_date(jd: f64) -> String {
    let text = format!("{}", jd);
    if jd.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Write the header and state. Components are followed by a space, with a
/// line break after the position and after the velocity.
///
/// A position-only state is rejected with `InvalidInput` before anything is
/// written.
pub fn write_initial_conditions<W: Write>(
    out: &mut W,
    tstart_tdb_jd: f64,
    state: &StateVector,
    header: &IntegratorHeader,
) -> io::Result<()> {
    if !state.has_velocity() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("state has {} components, expected 6", state.len()),
        ));
    }
    writeln!(out, "tstart {}", format_julian_date(tstart_tdb_jd))?;
    writeln!(out, "tstep {}", header.tstep)?;
    writeln!(out, "trange {}", header.trange)?;
    writeln!(out, "geocentric {}", header.geocentric)?;
    writeln!(out, "state")?;
    for (n, value) in state.as_slice().iter().enumerate() {
        write!(out, "{} ", format_component(*value))?;
        if n == 2 || n == 5 {
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::{Frame, Origin};
    use nalgebra::{Vector3, Vector6};
    use rstest::rstest;

    #[rstest]
    #[case(1.0, " 1.000000000000000e+00")]
    #[case(-1.0, "-1.000000000000000e+00")]
    #[case(0.0, " 0.000000000000000e+00")]
    #[case(0.3, " 3.000000000000000e-01")]
    #[case(-0.000123456789, "-1.234567890000000e-04")]
    #[case(1.5e123, " 1.500000000000000e+123")]
    #[case(2.5e-7, " 2.500000000000000e-07")]
    #[case(f64::NAN, "               nan")]
    #[case(f64::NEG_INFINITY, "              -inf")]
    fn test_format_component(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_component(value), expected);
    }

    #[rstest]
    #[case(2458849.5, "2458849.5")]
    #[case(2458849.0, "2458849.0")]
    #[case(2458849.500800741, "2458849.500800741")]
    fn test_format_julian_date(#[case] jd: f64, #[case] expected: &str) {
        assert_eq!(format_julian_date(jd), expected);
    }

    #[test]
    fn test_write_initial_conditions() {
        let state = StateVector::new(
            Vector6::new(3.0, 2.0, 1.0, 0.3, 0.2, 0.1),
            Frame::Equatorial,
            Origin::Barycentric,
        );
        let mut out = Vec::new();
        write_initial_conditions(&mut out, 2458849.5, &state, &IntegratorHeader::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "tstart 2458849.5\n\
                        tstep +20.0\n\
                        trange 600.\n\
                        geocentric 0\n\
                        state\n \
                        3.000000000000000e+00  2.000000000000000e+00  1.000000000000000e+00 \n \
                        3.000000000000000e-01  2.000000000000000e-01  1.000000000000000e-01 \n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_position_only_state_is_rejected() {
        let state = StateVector::from_position(Vector3::new(1.0, 2.0, 3.0), Frame::Equatorial, Origin::Barycentric);
        let mut out = Vec::new();
        let err = write_initial_conditions(&mut out, 2458849.5, &state, &IntegratorHeader::default()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(out.is_empty());
    }

    #[test]
    fn test_header_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("header.json");
        fs::write(&path, r#"{"tstep": "-10.0"}"#).unwrap();
        let header = IntegratorHeader::from_json_file(&path).unwrap();
        assert_eq!(header.tstep, "-10.0");
        assert_eq!(header.trange, "600.");
        assert_eq!(header.geocentric, 0);
    }
}
