//! Constants module for astronomical calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in kilometers (per IAU 2012 Resolution B2)
pub const AU_KM: f64 = 149_597_870.700;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Offset between Julian date and Modified Julian date
pub const MJD_OFFSET: f64 = 2_400_000.5;
/// Days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

// Angles
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = PI / (180.0 * 3600.0);
/// Mean obliquity of the ecliptic at J2000 in arcseconds (JPL Horizons value)
pub const OBLIQUITY_J2000_ASEC: f64 = 84_381.4118;
/// Mean obliquity of the ecliptic at J2000 in radians
pub const OBLIQUITY_J2000: f64 = OBLIQUITY_J2000_ASEC * ASEC2RAD;

// NAIF body codes used for the barycentric shift
/// Solar system barycenter
pub const SSB_ID: i32 = 0;
/// The Sun
pub const SUN_ID: i32 = 10;
