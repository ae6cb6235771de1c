//! Solar system body states used by the heliocentric/barycentric translation
//!
//! The frame transforms only ever need one quantity: where the Sun sits
//! relative to the solar system barycenter at a given instant. The
//! [`Ephemeris`] trait is that capability, so callers can inject an SPK kernel
//! in production and a constant state in tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use log::{debug, info};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{SSB_ID, SUN_ID};
use crate::jplephem::errors::Result;
use crate::jplephem::names::describe_target;
use crate::jplephem::SPK;
use crate::time::Epoch;

/// Position and velocity of a body relative to a center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Position in km
    pub position: Vector3<f64>,
    /// Velocity in km/day
    pub velocity: Vector3<f64>,
}

impl BodyState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }
}

/// Source of the Sun's barycentric state
pub trait Ephemeris: Send + Sync {
    /// State of the Sun relative to the solar system barycenter at `epoch`.
    ///
    /// Implementations evaluate on the TDB scale, converting the epoch if it
    /// carries another scale.
    fn sun_barycentric(&self, epoch: &Epoch) -> Result<BodyState>;

    /// Short human readable description for logs
    fn describe(&self) -> String;
}

/// Ephemeris backed by a JPL SPK kernel, memoizing each evaluated epoch
pub struct SpkEphemeris {
    spk: SPK,
    cache: Mutex<HashMap<(u64, u64), BodyState>>,
}

impl SpkEphemeris {
    /// Open the kernel at `path` and check it can place the Sun
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let spk = SPK::open(path)?;
        let segment = spk.get_segment(SSB_ID, SUN_ID)?;
        info!(
            "Loaded ephemeris {} ({} segments), Sun coverage JD {}..{}",
            spk.daf.path.display(),
            spk.segments.len(),
            segment.start_jd,
            segment.end_jd
        );
        Ok(Self::from_spk(spk))
    }

    pub fn from_spk(spk: SPK) -> Self {
        Self {
            spk,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying kernel
    pub fn spk(&self) -> &SPK {
        &self.spk
    }

    /// Number of memoized epochs
    pub fn cached_epochs(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl Ephemeris for SpkEphemeris {
    fn sun_barycentric(&self, epoch: &Epoch) -> Result<BodyState> {
        let (whole, fraction) = epoch.to_tdb().parts();
        let key = (whole.to_bits(), fraction.to_bits());

        if let Ok(cache) = self.cache.lock() {
            if let Some(state) = cache.get(&key) {
                return Ok(*state);
            }
        }

        let (position, velocity) = self
            .spk
            .compute_and_differentiate(SSB_ID, SUN_ID, whole, fraction)?;
        let state = BodyState::new(position, velocity);
        debug!(
            "{} relative to {} at JD {} TDB: {:?} km",
            describe_target(SUN_ID),
            describe_target(SSB_ID),
            whole + fraction,
            state.position.as_slice()
        );

        // A poisoned lock only costs us the memo
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, state);
        }
        Ok(state)
    }

    fn describe(&self) -> String {
        format!("SPK kernel {}", self.spk.daf.path.display())
    }
}

/// Ephemeris returning the same Sun state at every epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedEphemeris {
    pub state: BodyState,
}

impl FixedEphemeris {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            state: BodyState::new(position, velocity),
        }
    }

    /// Sun at the barycenter, at rest
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }
}

impl Ephemeris for FixedEphemeris {
    fn sun_barycentric(&self, _epoch: &Epoch) -> Result<BodyState> {
        Ok(self.state)
    }

    fn describe(&self) -> String {
        format!(
            "fixed Sun state [{}, {}, {}] km",
            self.state.position.x, self.state.position.y, self.state.position.z
        )
    }
}
