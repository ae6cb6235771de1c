//! Position or position+velocity vectors tagged with frame and origin

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};

use super::{Frame, Origin};
use crate::{ConversionError, Result};

/// The numeric part of a state: exactly 3 or exactly 6 components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Components {
    /// x, y, z in AU
    Position(Vector3<f64>),
    /// x, y, z in AU then vx, vy, vz in AU/day
    PositionVelocity(Vector6<f64>),
}

/// A cartesian state snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub components: Components,
    pub frame: Frame,
    pub origin: Origin,
}

impl StateVector {
    /// A full position and velocity state
    pub fn new(values: Vector6<f64>, frame: Frame, origin: Origin) -> Self {
        Self {
            components: Components::PositionVelocity(values),
            frame,
            origin,
        }
    }

    /// A position-only state
    pub fn from_position(position: Vector3<f64>, frame: Frame, origin: Origin) -> Self {
        Self {
            components: Components::Position(position),
            frame,
            origin,
        }
    }

    /// Build from an untyped slice, which must hold 3 or 6 values
    pub fn from_slice(values: &[f64], frame: Frame, origin: Origin) -> Result<Self> {
        match values.len() {
            3 => Ok(Self::from_position(Vector3::from_column_slice(values), frame, origin)),
            6 => Ok(Self::new(Vector6::from_column_slice(values), frame, origin)),
            n => Err(ConversionError::InvalidShape(format!(
                "state vector must have 3 or 6 components, got {}",
                n
            ))),
        }
    }

    /// Number of components (3 or 6)
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Always false; a state has at least a position
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn has_velocity(&self) -> bool {
        matches!(self.components, Components::PositionVelocity(_))
    }

    pub fn position(&self) -> Vector3<f64> {
        match &self.components {
            Components::Position(p) => *p,
            Components::PositionVelocity(v) => v.fixed_rows::<3>(0).into_owned(),
        }
    }

    pub fn velocity(&self) -> Option<Vector3<f64>> {
        match &self.components {
            Components::Position(_) => None,
            Components::PositionVelocity(v) => Some(v.fixed_rows::<3>(3).into_owned()),
        }
    }

    /// Components in order, position first
    pub fn as_slice(&self) -> &[f64] {
        match &self.components {
            Components::Position(p) => p.as_slice(),
            Components::PositionVelocity(v) => v.as_slice(),
        }
    }

    /// Same shape with new values and tags
    ///
    /// `position` and `velocity` are applied to the corresponding parts; the
    /// velocity closure is not called for position-only states.
    pub fn map<P, V>(&self, frame: Frame, origin: Origin, position: P, velocity: V) -> Self
    where
        P: Fn(Vector3<f64>) -> Vector3<f64>,
        V: Fn(Vector3<f64>) -> Vector3<f64>,
    {
        let components = match self.velocity() {
            None => Components::Position(position(self.position())),
            Some(vel) => {
                let p = position(self.position());
                let v = velocity(vel);
                Components::PositionVelocity(Vector6::new(p.x, p.y, p.z, v.x, v.y, v.z))
            }
        };
        Self {
            components,
            frame,
            origin,
        }
    }
}
