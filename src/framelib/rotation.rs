//! Rotation between ecliptic and equatorial axes
//!
//! Both frames share the x axis (the J2000 equinox), so the transform is a
//! single rotation about x by the mean obliquity of the ecliptic at J2000.

use lazy_static::lazy_static;
use log::trace;
use nalgebra::{Matrix3, Matrix6};

use super::Direction;
use crate::constants::OBLIQUITY_J2000;
use crate::coordinates::{Covariance, Frame, StateVector};
use crate::{ConversionError, Result};

lazy_static! {
    static ref ECLIPTIC_TO_EQUATORIAL: Matrix3<f64> = rotation_about_x(OBLIQUITY_J2000);
    static ref EQUATORIAL_TO_ECLIPTIC: Matrix3<f64> = rotation_about_x(-OBLIQUITY_J2000);
}

/// Rotation about the x axis taking ecliptic coordinates to equatorial ones
/// when `angle` is the obliquity
fn rotation_about_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, -s, //
        0.0, s, c,
    )
}

/// 3x3 rotation for the given direction
pub fn rotation_matrix(direction: Direction) -> Matrix3<f64> {
    match direction {
        Direction::Forward => *ECLIPTIC_TO_EQUATORIAL,
        Direction::Backward => *EQUATORIAL_TO_ECLIPTIC,
    }
}

/// Block diagonal 6x6 rotation acting on position and velocity together
pub fn state_rotation_matrix(direction: Direction) -> Matrix6<f64> {
    let r = rotation_matrix(direction);
    let mut r6 = Matrix6::zeros();
    r6.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    r6.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
    r6
}

/// Frames a rotation maps from and to
fn frames(direction: Direction) -> (Frame, Frame) {
    match direction {
        Direction::Forward => (Frame::Ecliptic, Frame::Equatorial),
        Direction::Backward => (Frame::Equatorial, Frame::Ecliptic),
    }
}

fn check_frame(found: Frame, expected: Frame) -> Result<()> {
    if found != expected {
        return Err(ConversionError::FrameMismatch { expected, found });
    }
    Ok(())
}

/// Rotate a 3 or 6 component state. The origin is unchanged.
pub fn rotate_state(state: &StateVector, direction: Direction) -> Result<StateVector> {
    let (from, to) = frames(direction);
    check_frame(state.frame, from)?;
    let r = rotation_matrix(direction);
    let rotated = state.map(to, state.origin, |p| r * p, |v| r * v);
    trace!("Rotated {} -> {}: {:?}", from, to, rotated.as_slice());
    Ok(rotated)
}

/// Congruence transform R6 C R6^T
pub fn rotate_covariance(covariance: &Covariance, direction: Direction) -> Result<Covariance> {
    let (from, to) = frames(direction);
    check_frame(covariance.frame, from)?;
    let r6 = state_rotation_matrix(direction);
    Ok(Covariance::new(r6 * covariance.matrix * r6.transpose(), to))
}

pub fn ecliptic_to_equatorial(state: &StateVector) -> Result<StateVector> {
    rotate_state(state, Direction::Forward)
}

pub fn equatorial_to_ecliptic(state: &StateVector) -> Result<StateVector> {
    rotate_state(state, Direction::Backward)
}
