//! Game state snapshot: the complete visible state handed to presentation each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{Alert, CombatEvent};
use crate::types::{EntityId, Pose, SimTime};

/// Complete game state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub player: Option<PlayerView>,
    pub agents: Vec<AgentView>,
    pub waves: WaveView,
    pub events: Vec<CombatEvent>,
    pub alerts: Vec<Alert>,
}

/// The player's ship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: EntityId,
    pub pose: Pose,
    pub speed: f64,
    pub health_fraction: f64,
    pub shield_fraction: f64,
    pub ammo: u32,
    pub magazine_size: u32,
    pub reloading: bool,
    pub dead: bool,
}

/// One AI agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: EntityId,
    pub pose: Pose,
    pub state: AiState,
    /// Wave the agent was spawned in.
    pub wave: u32,
    pub health_fraction: f64,
    pub dead: bool,
}

/// Wave director counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveView {
    pub phase: WavePhase,
    pub wave: u32,
    pub active: u32,
    pub killed: u32,
    pub spawned: u32,
}
