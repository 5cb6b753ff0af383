//! Events published by the simulation for presentation and bookkeeping.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::{AlertLevel, Team};
use crate::types::EntityId;

/// Everything observable that happened during a tick, in publication order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// Health changed; `fraction` is current / max.
    HealthChanged { entity: EntityId, fraction: f64 },
    /// Shield changed; `fraction` is current / max (0 without a shield).
    ShieldChanged { entity: EntityId, fraction: f64 },
    /// Damage landed (before shield/health split).
    Damaged {
        entity: EntityId,
        amount: f64,
        hit_point: DVec3,
        hit_direction: DVec3,
    },
    /// Health reached zero. Published exactly once per life.
    Died { entity: EntityId, team: Team },
    /// Entity came back at its spawn pose with full vitality.
    Respawned { entity: EntityId },
    /// Entity was removed from the world after its death delay.
    Destroyed { entity: EntityId },
    /// A ray was fired. `end` is the hit point, or the end of the range on a miss.
    ShotFired {
        shooter: EntityId,
        origin: DVec3,
        end: DVec3,
        hit: bool,
    },
    ReloadStarted { entity: EntityId },
    ReloadFinished { entity: EntityId },
    EnemySpawned { entity: EntityId, wave: u32 },
    EnemyKilled { entity: EntityId, remaining: u32 },
    WaveStarted { wave: u32, enemy_count: u32 },
    WaveCompleted { wave: u32 },
    AllWavesCompleted { waves: u32 },
}

/// Alert for the UI alert queue (configuration problems, milestones).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
}
