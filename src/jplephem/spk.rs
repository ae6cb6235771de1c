//! Spacecraft Planet Kernel (SPK) format handling
//!
//! This module provides functionality for reading NASA SPICE SPK files which
//! contain position and velocity data for solar system bodies.
//!
//! The SPK format is described in:
//! http://naif.jpl.nasa.gov/pub/naif/toolkit_docs/FORTRAN/req/spk.html
//!
//! Positions come back in kilometers and velocities in kilometers per day,
//! the same units Python's jplephem uses.
use crate::jplephem::calendar::format_date;
use crate::jplephem::chebyshev::{clenshaw, clenshaw_derivative, normalize_time};
use crate::jplephem::daf::DAF;
use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::names::describe_target;
use log::debug;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::path::Path;

/// J2000 epoch as Julian date
const T0: f64 = 2451545.0;
/// Seconds per day
const S_PER_DAY: f64 = 86400.0;

/// Convert seconds since J2000 to Julian date
pub fn seconds_to_jd(seconds: f64) -> f64 {
    T0 + seconds / S_PER_DAY
}

/// Spacecraft Planet Kernel (SPK) file reader
pub struct SPK {
    /// The underlying DAF file
    pub daf: DAF,
    /// List of segments in the file
    pub segments: Vec<Segment>,
    /// Map of (center, target) pairs to segment indices
    pairs: HashMap<(i32, i32), usize>,
}

/// A segment in an SPK file containing position data for a specific body
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Source of the segment (e.g., "DE-0430LE-0430")
    pub source: String,
    /// Initial epoch in seconds since J2000
    pub start_second: f64,
    /// Final epoch in seconds since J2000
    pub end_second: f64,
    /// Target body ID
    pub target: i32,
    /// Center body ID
    pub center: i32,
    /// Reference frame ID
    pub frame: i32,
    /// Data type (2: position only, 3: position and velocity)
    pub data_type: i32,
    /// First word address of the segment data
    pub start_i: usize,
    /// Last word address of the segment data
    pub end_i: usize,
    /// Start Julian date
    pub start_jd: f64,
    /// End Julian date
    pub end_jd: f64,
}

impl SPK {
    /// Open an SPK file at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let daf = DAF::open(path)?;
        if daf.nd != 2 || daf.ni != 6 {
            return Err(JplephemError::InvalidFormat(format!(
                "SPK summaries need ND=2, NI=6; {} has ND={}, NI={}",
                daf.path.display(),
                daf.nd,
                daf.ni
            )));
        }

        let mut spk = SPK {
            daf,
            segments: Vec::new(),
            pairs: HashMap::new(),
        };
        spk.parse_segments()?;
        Ok(spk)
    }

    /// Parse segments from the DAF summaries
    fn parse_segments(&mut self) -> Result<()> {
        for summary in self.daf.summaries()? {
            let (start_second, end_second) = (summary.doubles[0], summary.doubles[1]);
            let ints = &summary.integers;
            let (start_i, end_i) = (ints[4], ints[5]);
            if start_i < 1 || end_i < start_i {
                return Err(JplephemError::InvalidFormat(format!(
                    "Segment {:?} has invalid address range {}..{}",
                    summary.name, start_i, end_i
                )));
            }

            let segment = Segment {
                source: summary.name,
                start_second,
                end_second,
                target: ints[0],
                center: ints[1],
                frame: ints[2],
                data_type: ints[3],
                start_i: start_i as usize,
                end_i: end_i as usize,
                start_jd: seconds_to_jd(start_second),
                end_jd: seconds_to_jd(end_second),
            };
            debug!("Found segment {}", segment);

            // Later segments take precedence, as in SPICE
            let idx = self.segments.len();
            self.pairs.insert((segment.center, segment.target), idx);
            self.segments.push(segment);
        }
        Ok(())
    }

    /// Return the segment for the given center and target body IDs
    pub fn get_segment(&self, center: i32, target: i32) -> Result<&Segment> {
        self.pairs
            .get(&(center, target))
            .map(|&idx| &self.segments[idx])
            .ok_or(JplephemError::SegmentNotFound { center, target })
    }

    /// Read the comments from the SPK file
    pub fn comments(&self) -> Result<String> {
        self.daf.comments()
    }

    /// Position (km) of `target` relative to `center` at TDB Julian date `tdb + tdb2`
    pub fn compute(&self, center: i32, target: i32, tdb: f64, tdb2: f64) -> Result<Vector3<f64>> {
        let segment = self.get_segment(center, target)?;
        Ok(segment.compute_and_differentiate(&self.daf, tdb, tdb2)?.0)
    }

    /// Position (km) and velocity (km/day) of `target` relative to `center`
    pub fn compute_and_differentiate(
        &self,
        center: i32,
        target: i32,
        tdb: f64,
        tdb2: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let segment = self.get_segment(center, target)?;
        segment.compute_and_differentiate(&self.daf, tdb, tdb2)
    }
}

impl Segment {
    /// Compute position (km) and velocity (km/day) at the TDB Julian date
    /// `tdb + tdb2`, reading only the Chebyshev record that covers it
    pub fn compute_and_differentiate(
        &self,
        daf: &DAF,
        tdb: f64,
        tdb2: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>)> {
        let components = match self.data_type {
            2 => 3,
            3 => 6,
            other => return Err(JplephemError::UnsupportedDataType(other)),
        };

        let et = ((tdb - T0) + tdb2) * S_PER_DAY;
        if et < self.start_second || et > self.end_second {
            return Err(JplephemError::OutOfRange {
                jd: tdb + tdb2,
                start_jd: self.start_jd,
                end_jd: self.end_jd,
            });
        }

        // The last 4 words are the directory: init, intlen, rsize, n_rec
        if self.end_i < self.start_i + 3 {
            return Err(JplephemError::InvalidFormat(
                "Segment data array too small for a directory".to_string(),
            ));
        }
        let directory = daf.read_array(self.end_i - 3, self.end_i)?;
        let (init, intlen) = (directory[0], directory[1]);
        let rsize = directory[2] as usize;
        let n_rec = directory[3] as usize;
        if rsize < 2 + components || intlen <= 0.0 || n_rec == 0 {
            return Err(JplephemError::InvalidFormat(format!(
                "Bad segment directory: intlen={}, rsize={}, n_rec={}",
                intlen, rsize, n_rec
            )));
        }
        if n_rec * rsize + 4 != self.end_i - self.start_i + 1 {
            return Err(JplephemError::InvalidFormat(format!(
                "Inconsistent array size: expected {}, got {}",
                n_rec * rsize + 4,
                self.end_i - self.start_i + 1
            )));
        }

        let record_index = find_record_index(et, init, intlen, n_rec)?;
        let first = self.start_i + record_index * rsize;
        let record = daf.read_array(first, first + rsize - 1)?;

        let (record_mid, record_radius) = (record[0], record[1]);
        let n_coeffs = (rsize - 2) / components;
        let series = |k: usize| &record[2 + k * n_coeffs..2 + (k + 1) * n_coeffs];

        let s = normalize_time(et, record_mid, record_radius)?;
        let position = Vector3::new(clenshaw(series(0), s), clenshaw(series(1), s), clenshaw(series(2), s));

        let velocity_per_second = if components == 3 {
            // Type 2: differentiate the position series
            Vector3::new(
                clenshaw_derivative(series(0), s),
                clenshaw_derivative(series(1), s),
                clenshaw_derivative(series(2), s),
            ) / record_radius
        } else {
            // Type 3: velocity has its own series in km/s
            Vector3::new(clenshaw(series(3), s), clenshaw(series(4), s), clenshaw(series(5), s))
        };

        Ok((position, velocity_per_second * S_PER_DAY))
    }

    /// Return a textual description of the segment
    pub fn describe(&self, verbose: bool) -> String {
        let mut text = format!(
            "{}..{}  Type {}  {} -> {}",
            format_date(self.start_jd),
            format_date(self.end_jd),
            self.data_type,
            describe_target(self.center),
            describe_target(self.target)
        );
        if verbose {
            let source = if self.source.is_empty() {
                "Unknown"
            } else {
                self.source.as_str()
            };
            text.push_str(&format!("\n  frame={} source={}", self.frame, source));
        }
        text
    }
}

/// Find the index of the record that contains the given time
fn find_record_index(et: f64, init: f64, intlen: f64, n_records: usize) -> Result<usize> {
    let elapsed = et - init;
    let out_of_range = || JplephemError::OutOfRange {
        jd: seconds_to_jd(et),
        start_jd: seconds_to_jd(init),
        end_jd: seconds_to_jd(init + intlen * n_records as f64),
    };

    if elapsed < 0.0 {
        return Err(out_of_range());
    }
    let index = (elapsed / intlen).floor() as usize;
    match index {
        i if i < n_records => Ok(i),
        // The final instant of the segment belongs to the last record
        i if i == n_records && elapsed <= intlen * n_records as f64 => Ok(n_records - 1),
        _ => Err(out_of_range()),
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe(false))
    }
}
