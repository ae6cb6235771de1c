//! OrbFit `fel`/`eq` element files
//!
//! An OrbFit output file may hold several element sections; the one of
//! interest starts at the header line
//!
//! ```text
//! ! Cartesian position and velocity vectors
//!  CAR   x y z dx dy dz
//!  MJD   58849.000000000 TDT
//!  COV   ...
//! ```
//!
//! Positions are heliocentric ecliptic AU, velocities AU/day and the epoch is
//! an MJD on the TT scale. When a file holds more than one cartesian section
//! the last one wins.

pub mod covariance;

use std::fs;
use std::path::Path;

use log::{debug, info};
use nalgebra::Vector6;

use crate::coordinates::{Covariance, Frame, Origin, StateVector};
use crate::time::{Epoch, TimeScale};
use crate::{ConversionError, Result};

pub use covariance::{parse_covariance, parse_covariance_lines};

/// Header line opening a cartesian section
pub const CARTESIAN_HEADER: &str = "! Cartesian position and velocity vectors";
/// Lines read from the header onward
pub const BLOCK_LINES: usize = 25;

/// Contents of the cartesian section of an OrbFit file
#[derive(Debug, Clone, PartialEq)]
pub struct OrbfitElements {
    /// Heliocentric ecliptic position and velocity
    pub state: StateVector,
    /// Epoch of the state, TT
    pub epoch: Epoch,
    /// Heliocentric ecliptic covariance, when the file has one
    pub covariance: Option<Covariance>,
    /// 1-based line number of the header that was used
    pub header_line: usize,
}

/// Read and parse an OrbFit file
pub fn parse_orbfit_file<P: AsRef<Path>>(path: P) -> Result<OrbfitElements> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConversionError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let elements = parse_orbfit_str(&text, &path.display().to_string())?;
    info!(
        "Parsed {} (section at line {}, covariance {})",
        path.display(),
        elements.header_line,
        if elements.covariance.is_some() { "present" } else { "absent" }
    );
    Ok(elements)
}

/// Parse OrbFit text. `source_name` only labels errors.
pub fn parse_orbfit_str(text: &str, source_name: &str) -> Result<OrbfitElements> {
    let lines: Vec<&str> = text.lines().collect();

    let header_index = lines
        .iter()
        .rposition(|line| line.trim_end() == CARTESIAN_HEADER)
        .ok_or_else(|| ConversionError::NoValidElements(source_name.to_string()))?;
    debug!("Cartesian header at line {} of {}", header_index + 1, source_name);

    let end = (header_index + BLOCK_LINES).min(lines.len());
    let block: Vec<(usize, &str)> = (header_index..end).map(|i| (i + 1, lines[i])).collect();

    let state_line = block_line(&block, 1, header_index)?;
    let values = fields(state_line, 7, "cartesian state")?
        .iter()
        .skip(1)
        .map(|field| parse_number(field, state_line.0, state_line.1))
        .collect::<Result<Vec<f64>>>()?;
    let state = StateVector::new(
        Vector6::from_column_slice(&values),
        Frame::Ecliptic,
        Origin::Heliocentric,
    );

    let epoch_line = block_line(&block, 2, header_index)?;
    let epoch_fields = fields(epoch_line, 3, "epoch")?;
    let epoch = Epoch::parse_mjd(epoch_fields[1], TimeScale::Tt).map_err(|e| ConversionError::MalformedLine {
        line: epoch_line.0,
        text: epoch_line.1.to_string(),
        reason: e.to_string(),
    })?;

    let covariance = covariance::parse_block(&block)?;

    Ok(OrbfitElements {
        state,
        epoch,
        covariance,
        header_line: header_index + 1,
    })
}

fn block_line<'a>(block: &[(usize, &'a str)], offset: usize, header_index: usize) -> Result<(usize, &'a str)> {
    block.get(offset).copied().ok_or_else(|| ConversionError::MalformedLine {
        line: header_index + offset + 1,
        text: String::new(),
        reason: "file ends inside the cartesian section".to_string(),
    })
}

fn fields<'a>((line_number, line): (usize, &'a str), expected: usize, what: &str) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != expected {
        return Err(ConversionError::MalformedLine {
            line: line_number,
            text: line.to_string(),
            reason: format!("{} line needs {} fields, found {}", what, expected, fields.len()),
        });
    }
    Ok(fields)
}

/// Parse a finite number, accepting Fortran `D` exponents
pub(crate) fn parse_number(field: &str, line_number: usize, line: &str) -> Result<f64> {
    let value = field
        .replace(['D', 'd'], "e")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite());
    value.ok_or_else(|| ConversionError::MalformedLine {
        line: line_number,
        text: line.to_string(),
        reason: format!("{:?} is not a number", field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SIMPLE: &str = "\
format  = 'OEF2.0'
rectype = 'ML'
refsys  = ECLM J2000
END_OF_HEADER
! Cartesian position and velocity vectors
 CAR   1.0 2.0 3.0 0.1 0.2 0.3
 MJD     58849.000000000 TDT
";

    #[test]
    fn test_parse_simple_section() {
        let elements = parse_orbfit_str(SIMPLE, "simple.eq").unwrap();
        assert_eq!(elements.state.as_slice(), &[1.0, 2.0, 3.0, 0.1, 0.2, 0.3]);
        assert_eq!(elements.state.frame, Frame::Ecliptic);
        assert_eq!(elements.state.origin, Origin::Heliocentric);
        assert_eq!(elements.epoch.scale(), TimeScale::Tt);
        assert_eq!(elements.epoch.mjd(), 58849.0);
        assert_eq!(elements.header_line, 5);
        assert!(elements.covariance.is_none());
    }

    #[test]
    fn test_last_section_wins() {
        let text = format!(
            "{}\
! Cartesian position and velocity vectors
 CAR   -4.0 5.0 -6.0 0.04 0.05 0.06
 MJD     59000.500000000 TDT
",
            SIMPLE
        );
        let elements = parse_orbfit_str(&text, "two.eq").unwrap();
        assert_eq!(elements.state.as_slice(), &[-4.0, 5.0, -6.0, 0.04, 0.05, 0.06]);
        assert_eq!(elements.epoch.mjd(), 59000.5);
        assert_eq!(elements.header_line, 8);
    }

    #[test]
    fn test_missing_header() {
        let text = "! Keplerian elements: a, e, i, long. node, arg. peric., mean anomaly\n KEP 1 2 3 4 5 6\n";
        match parse_orbfit_str(text, "kep.eq") {
            Err(ConversionError::NoValidElements(name)) => assert_eq!(name, "kep.eq"),
            other => panic!("expected NoValidElements, got {:?}", other),
        }
    }

    #[test]
    fn test_header_with_trailing_whitespace_and_crlf() {
        let text = "! Cartesian position and velocity vectors  \r\n CAR 1 2 3 4 5 6\r\n MJD 58849.0 TDT\r\n";
        let elements = parse_orbfit_str(text, "crlf.eq").unwrap();
        assert_eq!(elements.state.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_truncated_section() {
        let text = "! Cartesian position and velocity vectors\n CAR 1 2 3 4 5 6\n";
        match parse_orbfit_str(text, "short.eq") {
            Err(ConversionError::MalformedLine { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_epoch_line() {
        let text = "! Cartesian position and velocity vectors\n CAR 1 2 3 4 5 6\n MJD soon TDT\n";
        match parse_orbfit_str(text, "bad.eq") {
            Err(ConversionError::MalformedLine { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("soon"));
            }
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_state_line() {
        let text = "! Cartesian position and velocity vectors\n CAR 1 2 3 4 5\n MJD 58849.0 TDT\n";
        assert!(matches!(
            parse_orbfit_str(text, "bad.eq"),
            Err(ConversionError::MalformedLine { line: 2, .. })
        ));

        let text = "! Cartesian position and velocity vectors\n CAR 1 2 x 4 5 6\n MJD 58849.0 TDT\n";
        assert!(matches!(
            parse_orbfit_str(text, "bad.eq"),
            Err(ConversionError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_covariance_in_block() {
        let mut text = String::from("! Cartesian position and velocity vectors\n CAR 1 2 3 4 5 6\n MJD 58849.0 TDT\n");
        for i in 0..7 {
            text.push_str(&format!(" COV   {}D-08 {}D-08 {}D-08\n", 3 * i + 1, 3 * i + 2, 3 * i + 3));
        }
        let elements = parse_orbfit_str(&text, "cov.eq").unwrap();
        let cov = elements.covariance.unwrap();
        assert_relative_eq!(cov.matrix[(0, 0)], 1e-8);
        assert_relative_eq!(cov.matrix[(5, 5)], 21e-8);
        assert_relative_eq!(cov.matrix[(3, 0)], 4e-8);
    }

    #[test]
    fn test_covariance_outside_block_is_ignored() {
        let mut text = String::from("! Cartesian position and velocity vectors\n CAR 1 2 3 4 5 6\n MJD 58849.0 TDT\n");
        for _ in 0..30 {
            text.push_str("! padding\n");
        }
        for _ in 0..7 {
            text.push_str(" COV 1.0 1.0 1.0\n");
        }
        let elements = parse_orbfit_str(&text, "far.eq").unwrap();
        assert!(elements.covariance.is_none());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.5D+02", 1, "").unwrap(), 150.0);
        assert_eq!(parse_number("-2.5e-1", 1, "").unwrap(), -0.25);
        assert!(parse_number("nan", 1, "").is_err());
        assert!(parse_number("", 1, "").is_err());
    }
}
