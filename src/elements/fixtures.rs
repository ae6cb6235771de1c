//! Placeholder elements standing in for formats that are not parsed yet

use log::debug;
use nalgebra::{Matrix6, Vector6};

use super::ParsedElements;
use crate::coordinates::{Covariance, Frame, Origin, StateVector};
use crate::time::{Epoch, TimeScale};

/// Epoch of the placeholder elements, JD TDB
pub const PLACEHOLDER_JD_TDB: f64 = 2458849.5;

fn placeholder_values() -> Vector6<f64> {
    Vector6::new(3.0, 2.0, 1.0, 0.3, 0.2, 0.1)
}

fn placeholder_matrix() -> Matrix6<f64> {
    Matrix6::from_element(0.01)
}

impl ParsedElements {
    /// Fixed placeholder elements at JD 2458849.5 TDB with state
    /// `[3, 2, 1, 0.3, 0.2, 0.1]` and every covariance entry 0.01.
    ///
    /// By default the values fill the heliocentric ecliptic fields and are
    /// left for [`ParsedElements::make_bary_equatorial`]. With
    /// `bary_eq_direct` they are stored as the barycentric equatorial result
    /// as-is.
    pub fn placeholder_fixture(bary_eq_direct: bool) -> Self {
        let mut elements = ParsedElements {
            source: Some("placeholder".to_string()),
            epoch: Some(Epoch::from_jd(PLACEHOLDER_JD_TDB, TimeScale::Tdb)),
            ..ParsedElements::default()
        };

        if bary_eq_direct {
            debug!("Placeholder elements set directly as barycentric equatorial");
            elements.bary_eq_vec = Some(StateVector::new(
                placeholder_values(),
                Frame::Equatorial,
                Origin::Barycentric,
            ));
            elements.bary_eq_cov = Some(Covariance::new(placeholder_matrix(), Frame::Equatorial));
        } else {
            elements.helio_ecl_vec = Some(StateVector::new(
                placeholder_values(),
                Frame::Ecliptic,
                Origin::Heliocentric,
            ));
            elements.helio_ecl_cov = Some(Covariance::new(placeholder_matrix(), Frame::Ecliptic));
        }
        elements
    }
}
