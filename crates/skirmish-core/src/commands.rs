//! Player commands sent from the frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Flight ---
    /// Set thrust axes (each clamped to [-1, 1]).
    SetThrust {
        forward: f64,
        strafe: f64,
        vertical: f64,
        boost: bool,
    },
    /// Set rotation rate axes (each clamped to [-1, 1]).
    SetRotation { pitch: f64, yaw: f64, roll: f64 },

    // --- Weapon ---
    /// Press or release the trigger.
    SetTrigger { held: bool },
    /// Reload the magazine manually.
    Reload,

    // --- Waves ---
    /// Skip the inter-wave delay and start the next wave now.
    TriggerNextWave,
    /// Despawn every enemy of the current population.
    ClearEnemies,
    /// Clear enemies, zero counters, and restart the wave cycle.
    ResetWaves,

    // --- Simulation control ---
    /// Spawn the player and start the wave cycle.
    StartMission,
    Pause,
    Resume,
}
