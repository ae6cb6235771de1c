//! Covariance block of an OrbFit cartesian section
//!
//! OrbFit writes the 21 upper-triangular entries of the 6x6 covariance as
//! seven ` COV` lines of three values each, row by row:
//!
//! ```text
//!  COV  c00 c01 c02
//!  COV  c03 c04 c05
//!  COV  c11 c12 c13
//!  COV  c14 c15 c22
//!  COV  c23 c24 c25
//!  COV  c33 c34 c35
//!  COV  c44 c45 c55
//! ```

use log::{debug, warn};
use nalgebra::Matrix6;

use super::parse_number;
use crate::coordinates::{Covariance, Frame};
use crate::{ConversionError, Result};

/// Prefix marking a covariance line
pub const COV_PREFIX: &str = " COV";
/// Lines in a complete covariance block
pub const COV_LINES: usize = 7;
const VALUES_PER_LINE: usize = 3;

/// Parse the covariance from `lines`, returning the matrix and whether one
/// was present. Without exactly seven ` COV` lines the matrix is all zeros.
pub fn parse_covariance_lines<S: AsRef<str>>(lines: &[S]) -> Result<(Matrix6<f64>, bool)> {
    Ok(match parse_covariance(lines)? {
        Some(cov) => (cov.matrix, true),
        None => (Matrix6::zeros(), false),
    })
}

/// Parse the covariance from `lines` as an ecliptic [`Covariance`], or
/// `None` when the block is absent or incomplete
pub fn parse_covariance<S: AsRef<str>>(lines: &[S]) -> Result<Option<Covariance>> {
    let numbered: Vec<(usize, &str)> = lines.iter().enumerate().map(|(i, l)| (i + 1, l.as_ref())).collect();
    parse_block(&numbered)
}

/// As [`parse_covariance`] for lines already carrying their file line numbers
pub(crate) fn parse_block(lines: &[(usize, &str)]) -> Result<Option<Covariance>> {
    match parse_numbered(lines)? {
        Some(entries) => Ok(Some(Covariance::from_upper_triangle(&entries, Frame::Ecliptic)?)),
        None => Ok(None),
    }
}

fn parse_numbered(lines: &[(usize, &str)]) -> Result<Option<Vec<f64>>> {
    let cov_lines: Vec<&(usize, &str)> = lines.iter().filter(|(_, l)| l.starts_with(COV_PREFIX)).collect();
    if cov_lines.len() != COV_LINES {
        if cov_lines.is_empty() {
            debug!("No covariance lines found");
        } else {
            warn!(
                "Found {} covariance lines, expected {}; ignoring covariance",
                cov_lines.len(),
                COV_LINES
            );
        }
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(COV_LINES * VALUES_PER_LINE);
    for &&(line_number, line) in &cov_lines {
        let fields: Vec<&str> = line[COV_PREFIX.len()..].split_whitespace().collect();
        if fields.len() != VALUES_PER_LINE {
            return Err(ConversionError::MalformedLine {
                line: line_number,
                text: line.to_string(),
                reason: format!("expected {} covariance values, found {}", VALUES_PER_LINE, fields.len()),
            });
        }
        for field in fields {
            entries.push(parse_number(field, line_number, line)?);
        }
    }
    debug!("Parsed covariance block of {} entries", entries.len());
    Ok(Some(entries))
}
