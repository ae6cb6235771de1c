//! Time module for astronomical time calculations
//!
//! Epochs are stored as a Julian date split into a whole part and a fraction,
//! tagged with the time scale they are expressed in. Element files give their
//! epochs as Modified Julian Dates in Terrestrial Time (TT), while ephemeris
//! lookups and integrator output use Barycentric Dynamical Time (TDB).

use crate::constants::{DAYS_PER_CENTURY, DAY_S, J2000, MJD_OFFSET};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Unknown time scale: {0}")]
    UnknownScale(String),

    #[error("Parsing error: {0}")]
    ParseError(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// The time scales this crate converts between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScale {
    /// Terrestrial Time
    Tt,
    /// Barycentric Dynamical Time
    Tdb,
}

impl TimeScale {
    pub fn name(&self) -> &'static str {
        match self {
            TimeScale::Tt => "tt",
            TimeScale::Tdb => "tdb",
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeScale {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tt" | "tdt" => Ok(TimeScale::Tt),
            "tdb" => Ok(TimeScale::Tdb),
            other => Err(TimeError::UnknownScale(other.to_string())),
        }
    }
}

/// A point in time on a specific time scale
///
/// The Julian date is kept as `whole + fraction` so that an MJD read from a
/// file keeps its full precision through scale conversions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Epoch {
    whole: f64,
    fraction: f64,
    scale: TimeScale,
}

impl Epoch {
    /// Create an epoch from a Julian date
    pub fn from_jd(jd: f64, scale: TimeScale) -> Self {
        let whole = jd.floor();
        Self {
            whole,
            fraction: jd - whole,
            scale,
        }
    }

    /// Create an epoch from a two-part Julian date
    pub fn from_jd_parts(whole: f64, fraction: f64, scale: TimeScale) -> Self {
        Self {
            whole,
            fraction,
            scale,
        }
    }

    /// Create an epoch from a Modified Julian Date
    pub fn from_mjd(mjd: f64, scale: TimeScale) -> Self {
        Self::from_jd_parts(MJD_OFFSET, mjd, scale)
    }

    /// Parse a Modified Julian Date written as text, e.g. `"58849.0"`
    pub fn parse_mjd(text: &str, scale: TimeScale) -> Result<Self> {
        let mjd: f64 = text
            .trim()
            .parse()
            .map_err(|_| TimeError::ParseError(format!("not a Modified Julian Date: {:?}", text)))?;
        if !mjd.is_finite() {
            return Err(TimeError::InvalidFormat(format!(
                "Modified Julian Date must be finite, got {}",
                mjd
            )));
        }
        Ok(Self::from_mjd(mjd, scale))
    }

    /// The time scale this epoch is expressed in
    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    /// The two-part Julian date `(whole, fraction)`
    pub fn parts(&self) -> (f64, f64) {
        (self.whole, self.fraction)
    }

    /// Julian date on this epoch's own scale
    pub fn jd(&self) -> f64 {
        self.whole + self.fraction
    }

    /// Modified Julian Date on this epoch's own scale
    pub fn mjd(&self) -> f64 {
        (self.whole - MJD_OFFSET) + self.fraction
    }

    /// Express this epoch on the requested time scale
    pub fn to_scale(&self, scale: TimeScale) -> Epoch {
        match (self.scale, scale) {
            (TimeScale::Tt, TimeScale::Tdb) => {
                let offset = tdb_minus_tt(self.jd()) / DAY_S;
                Epoch::from_jd_parts(self.whole, self.fraction + offset, TimeScale::Tdb)
            }
            (TimeScale::Tdb, TimeScale::Tt) => {
                // TDB - TT is evaluated at TDB, so iterate on the TT estimate
                let mut offset = tdb_minus_tt(self.jd()) / DAY_S;
                for _ in 0..3 {
                    offset = tdb_minus_tt(self.jd() - offset) / DAY_S;
                }
                Epoch::from_jd_parts(self.whole, self.fraction - offset, TimeScale::Tt)
            }
            _ => *self,
        }
    }

    /// This epoch on the TDB scale
    pub fn to_tdb(&self) -> Epoch {
        self.to_scale(TimeScale::Tdb)
    }

    /// This epoch on the TT scale
    pub fn to_tt(&self) -> Epoch {
        self.to_scale(TimeScale::Tt)
    }

    /// TDB Julian date, converting if necessary
    pub fn tdb_jd(&self) -> f64 {
        self.to_tdb().jd()
    }
}

/// TDB - TT in seconds (USNO Circular 179, eq. 2.6)
pub fn tdb_minus_tt(jd: f64) -> f64 {
    let t = (jd - J2000) / DAYS_PER_CENTURY;

    0.001657 * f64::sin(628.3076 * t + 6.2401)
        + 0.000022 * f64::sin(575.3385 * t + 4.2970)
        + 0.000014 * f64::sin(1256.6152 * t + 6.1969)
        + 0.000005 * f64::sin(606.9777 * t + 4.0212)
        + 0.000005 * f64::sin(52.9691 * t + 0.4444)
        + 0.000002 * f64::sin(21.3299 * t + 5.5431)
        + 0.000010 * t * f64::sin(628.3076 * t + 4.2490)
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.9} {}", self.jd(), self.scale)
    }
}

impl Add<f64> for Epoch {
    type Output = Epoch;

    fn add(self, days: f64) -> Self::Output {
        Epoch::from_jd_parts(self.whole, self.fraction + days, self.scale)
    }
}

impl Sub<f64> for Epoch {
    type Output = Epoch;

    fn sub(self, days: f64) -> Self::Output {
        Epoch::from_jd_parts(self.whole, self.fraction - days, self.scale)
    }
}

impl PartialEq for Epoch {
    fn eq(&self, other: &Self) -> bool {
        self.scale == other.scale && self.jd() == other.jd()
    }
}

impl PartialOrd for Epoch {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.scale != other.scale {
            return None;
        }
        self.jd().partial_cmp(&other.jd())
    }
}
