//! # Cartesian state and covariance types
//!
//! A state snapshot is only meaningful together with the frame its axes are
//! aligned to and the origin it is measured from. Both are carried as tags on
//! [`StateVector`] and [`Covariance`] so the transforms in `framelib` can
//! refuse input in the wrong frame instead of silently producing garbage.
//!
//! ## Units
//!
//! Positions are in AU and velocities in AU/day throughout.
//!
//! ## Examples
//!
//! ```rust
//! use nalgebra::Vector6;
//! use orbfit_ic::coordinates::{Frame, Origin, StateVector};
//!
//! let state = StateVector::new(
//!     Vector6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3),
//!     Frame::Ecliptic,
//!     Origin::Heliocentric,
//! );
//! assert_eq!(state.len(), 6);
//! assert_eq!(state.position().x, 1.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod covariance;
pub mod state;

pub use covariance::Covariance;
pub use state::{Components, StateVector};

/// Orientation of the coordinate axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    /// x toward the J2000 equinox, z toward the ecliptic pole
    Ecliptic,
    /// x toward the J2000 equinox, z toward the celestial pole
    Equatorial,
}

impl Frame {
    pub fn name(&self) -> &'static str {
        match self {
            Frame::Ecliptic => "ecliptic",
            Frame::Equatorial => "equatorial",
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Point the coordinates are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Center of the Sun
    Heliocentric,
    /// Solar system barycenter
    Barycentric,
}

impl Origin {
    pub fn name(&self) -> &'static str {
        match self {
            Origin::Heliocentric => "heliocentric",
            Origin::Barycentric => "barycentric",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
