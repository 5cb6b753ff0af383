//! ECS components for hecs entities.
//!
//! Components are plain data structs. Game logic lives in the combat and AI
//! crates and in the simulation systems, not here.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::enums::AiState;
use crate::types::{EntityId, Pose};

/// Rigid body state driven by the movement capability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: DVec3,
    pub rotation: DQuat,
    pub velocity: DVec3,
    /// Fraction of velocity shed per second (applied as `1 / (1 + d * dt)`).
    pub linear_damping: f64,
}

impl Kinematics {
    pub fn at_rest(pose: Pose, linear_damping: f64) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            velocity: DVec3::ZERO,
            linear_damping,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }
}

/// Sphere collider used by the spatial query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f64,
    /// Layer bits this collider belongs to.
    pub layers: u32,
}

/// Whether an entity currently takes part in collision and presentation.
/// Cleared while dead, restored on respawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Presence {
    pub enabled: bool,
}

/// Weapon fire points in the ship's local frame. Rays leave along the ship's forward axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hardpoints {
    pub offsets: Vec<DVec3>,
}

/// Marks the player's ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Player;

/// Marks an AI-controlled combat agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Agent;

/// The wave an agent was spawned in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveMember {
    pub wave: u32,
}

/// Latest pilot input for the player ship. Axes are in [-1, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerControl {
    /// (strafe, vertical, forward).
    pub thrust: DVec3,
    pub boost: bool,
    /// (pitch, yaw, roll).
    pub turn: DVec3,
    pub trigger_held: bool,
}

/// Per-agent AI director state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBrain {
    pub state: AiState,
    /// Seconds spent in the current state; reset on entering Evade.
    pub state_timer_secs: f64,
    /// Earliest time the agent may fire again.
    pub next_fire_secs: f64,
    /// Where the agent patrols around.
    pub home: DVec3,
    pub patrol_point: DVec3,
    pub evasion_direction: DVec3,
    pub last_evasion_secs: Option<f64>,
    /// Weak reference to the current target; re-resolved every tick.
    pub target: Option<EntityId>,
}

impl AgentBrain {
    pub fn new(home: DVec3, patrol_point: DVec3) -> Self {
        Self {
            state: AiState::Patrol,
            state_timer_secs: 0.0,
            next_fire_secs: 0.0,
            home,
            patrol_point,
            evasion_direction: DVec3::Z,
            last_evasion_secs: None,
            target: None,
        }
    }
}
