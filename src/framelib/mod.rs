//! Reference frame transforms
//!
//! Two independent operations take an OrbFit state to the integrator's frame:
//! a fixed rotation from ecliptic to equatorial axes, and a time-dependent
//! shift of origin from the Sun to the solar system barycenter. Each has a
//! `Direction` so the inverse is available for checking round trips.

pub mod rotation;
pub mod translation;

pub use rotation::{
    ecliptic_to_equatorial, equatorial_to_ecliptic, rotate_covariance, rotate_state, rotation_matrix,
    state_rotation_matrix,
};
pub use translation::{bary_to_helio, helio_to_bary, translate_state};

/// Which way a transform runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ecliptic to equatorial, heliocentric to barycentric
    Forward,
    /// Equatorial to ecliptic, barycentric to heliocentric
    Backward,
}

impl Direction {
    /// +1 for forward, -1 for backward
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}
