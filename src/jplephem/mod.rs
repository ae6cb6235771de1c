//! JPL Ephemeris module for high-precision planetary positions
//!
//! This module provides functionality for reading and interpreting JPL Development
//! Ephemerides (DE) files, which contain high-precision position and velocity data
//! for solar system bodies.
//!
//! # Main Components
//!
//! - `daf`: Double Array File format reader (underlying format of SPK files)
//! - `spk`: Spacecraft Planet Kernel format reader
//! - `chebyshev`: Series evaluation used by SPK types 2 and 3
//! - `names`: Mappings between celestial body names and ID numbers
//! - Error types for proper error handling

pub mod calendar;
pub mod chebyshev;
pub mod daf;
pub mod errors;
pub mod names;
pub mod spk;


// Re-export primary types for convenience
pub use self::errors::JplephemError;
pub use self::spk::SPK;
