//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Allegiance of a combat entity. Shots never damage their own team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Player,
    Enemy,
    Neutral,
}

/// AI director state for a single agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Wandering between random points near home.
    #[default]
    Patrol,
    /// Closing on the target's predicted position.
    Chase,
    /// Holding the optimal range and firing when aligned.
    Attack,
    /// Short burst away along a random direction.
    Evade,
}

/// Wave director progression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Between waves (or before the first one).
    #[default]
    Idle,
    /// A spawn sequence is running.
    Spawning,
    /// The configured wave cap was reached. Terminal.
    AllComplete,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Setup,
    Active,
    Paused,
    /// Every configured wave has been cleared.
    Complete,
}

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}
