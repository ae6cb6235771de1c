//! Shift of origin between the Sun and the solar system barycenter

use log::debug;

use super::Direction;
use crate::constants::AU_KM;
use crate::coordinates::{Frame, Origin, StateVector};
use crate::planetlib::Ephemeris;
use crate::time::Epoch;
use crate::{ConversionError, Result};

/// Add (forward) or subtract (backward) the Sun's barycentric state at
/// `epoch`. The state must already be on equatorial axes, which is the frame
/// the ephemeris reports in.
pub fn translate_state(
    state: &StateVector,
    epoch: &Epoch,
    ephemeris: &dyn Ephemeris,
    direction: Direction,
) -> Result<StateVector> {
    if state.frame != Frame::Equatorial {
        return Err(ConversionError::FrameMismatch {
            expected: Frame::Equatorial,
            found: state.frame,
        });
    }
    let (from, to) = match direction {
        Direction::Forward => (Origin::Heliocentric, Origin::Barycentric),
        Direction::Backward => (Origin::Barycentric, Origin::Heliocentric),
    };
    if state.origin != from {
        return Err(ConversionError::OriginMismatch {
            expected: from,
            found: state.origin,
        });
    }

    let sun = ephemeris.sun_barycentric(epoch)?;
    let shift = direction.sign() / AU_KM;
    let dp = sun.position * shift;
    let dv = sun.velocity * shift;
    debug!(
        "Shifting {} -> {} at {} by [{:e}, {:e}, {:e}] AU",
        from,
        to,
        epoch,
        dp.x,
        dp.y,
        dp.z
    );

    Ok(state.map(state.frame, to, |p| p + dp, |v| v + dv))
}

pub fn helio_to_bary(state: &StateVector, epoch: &Epoch, ephemeris: &dyn Ephemeris) -> Result<StateVector> {
    translate_state(state, epoch, ephemeris, Direction::Forward)
}

pub fn bary_to_helio(state: &StateVector, epoch: &Epoch, ephemeris: &dyn Ephemeris) -> Result<StateVector> {
    translate_state(state, epoch, ephemeris, Direction::Backward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framelib::{ecliptic_to_equatorial, equatorial_to_ecliptic};
    use crate::planetlib::FixedEphemeris;
    use crate::time::TimeScale;
    use approx::assert_relative_eq;
    use nalgebra::{Vector3, Vector6};

    fn sun() -> FixedEphemeris {
        FixedEphemeris::new(
            Vector3::new(-1.0e6, 5.0e5, 2.0e4),
            Vector3::new(1.0e3, -2.0e3, 30.0),
        )
    }

    fn epoch() -> Epoch {
        Epoch::from_mjd(58849.0, TimeScale::Tt)
    }

    #[test]
    fn test_forward_adds_sun_state_in_au() {
        let state = StateVector::new(
            Vector6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3),
            Frame::Equatorial,
            Origin::Heliocentric,
        );
        let bary = helio_to_bary(&state, &epoch(), &sun()).unwrap();
        assert_eq!(bary.origin, Origin::Barycentric);
        assert_eq!(bary.frame, Frame::Equatorial);
        let v = bary.as_slice();
        assert_relative_eq!(v[0], 1.0 - 1.0e6 / AU_KM, epsilon = 1e-15);
        assert_relative_eq!(v[1], 2.0 + 5.0e5 / AU_KM, epsilon = 1e-15);
        assert_relative_eq!(v[2], 3.0 + 2.0e4 / AU_KM, epsilon = 1e-15);
        assert_relative_eq!(v[3], 0.1 + 1.0e3 / AU_KM, epsilon = 1e-15);
        assert_relative_eq!(v[4], 0.2 - 2.0e3 / AU_KM, epsilon = 1e-15);
        assert_relative_eq!(v[5], 0.3 + 30.0 / AU_KM, epsilon = 1e-15);
    }

    #[test]
    fn test_position_only() {
        let state = StateVector::from_position(Vector3::zeros(), Frame::Equatorial, Origin::Heliocentric);
        let bary = helio_to_bary(&state, &epoch(), &sun()).unwrap();
        assert_eq!(bary.len(), 3);
        assert_relative_eq!(bary.position().x, -1.0e6 / AU_KM);
    }

    #[test]
    fn test_full_round_trip() {
        let state = StateVector::new(
            Vector6::new(1.0, 2.0, 3.0, 0.1, 0.2, 0.3),
            Frame::Ecliptic,
            Origin::Heliocentric,
        );
        let ephem = sun();
        let forward = helio_to_bary(&ecliptic_to_equatorial(&state).unwrap(), &epoch(), &ephem).unwrap();
        let back = equatorial_to_ecliptic(&bary_to_helio(&forward, &epoch(), &ephem).unwrap()).unwrap();
        assert_eq!(back.frame, Frame::Ecliptic);
        assert_eq!(back.origin, Origin::Heliocentric);
        for (a, b) in back.as_slice().iter().zip(state.as_slice()) {
            assert_relative_eq!(a, b, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_tag_checks() {
        let ecliptic = StateVector::from_position(Vector3::x(), Frame::Ecliptic, Origin::Heliocentric);
        assert!(matches!(
            helio_to_bary(&ecliptic, &epoch(), &sun()),
            Err(ConversionError::FrameMismatch { .. })
        ));

        let bary = StateVector::from_position(Vector3::x(), Frame::Equatorial, Origin::Barycentric);
        assert!(matches!(
            helio_to_bary(&bary, &epoch(), &sun()),
            Err(ConversionError::OriginMismatch {
                expected: Origin::Heliocentric,
                found: Origin::Barycentric
            })
        ));
    }
}
