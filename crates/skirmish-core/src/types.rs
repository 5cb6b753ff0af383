//! Fundamental geometric and simulation types.
//!
//! Space is right-handed with +Y up and +Z as a ship's forward axis.

use std::fmt;

use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a simulation entity.
///
/// Holds the raw bits of a generational ECS handle. Resolving it against the
/// world fails once the entity has been despawned, so holders never keep a
/// dead entity alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DQuat::IDENTITY)
    }
}

impl Pose {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: DVec3) -> Self {
        Self::new(position, DQuat::IDENTITY)
    }

    /// Unit forward vector (+Z rotated by the orientation).
    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// Transform a point from local space into world space.
    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * local
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * self.dt();
    }
}

/// Orientation whose forward axis points along `forward`, keeping `up` as
/// close to +Y as possible. Returns `None` for a zero-length direction.
pub fn look_rotation(forward: DVec3, up: DVec3) -> Option<DQuat> {
    let z = forward.try_normalize()?;
    match up.cross(z).try_normalize() {
        Some(x) => {
            let y = z.cross(x);
            Some(DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize())
        }
        // Looking straight along the up axis.
        None => Some(DQuat::from_rotation_arc(DVec3::Z, z)),
    }
}

/// Rotate `from` toward `to` by at most `max_radians`.
pub fn rotate_towards(from: DQuat, to: DQuat, max_radians: f64) -> DQuat {
    if max_radians <= 0.0 {
        return from;
    }
    let angle = from.angle_between(to);
    if angle <= max_radians {
        return to;
    }
    from.slerp(to, max_radians / angle).normalize()
}

/// Angle in degrees between two directions. Zero-length input yields 0.
pub fn angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    if a.length_squared() == 0.0 || b.length_squared() == 0.0 {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}
