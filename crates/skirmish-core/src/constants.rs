//! Simulation constants and fixed tuning parameters.
//!
//! Per-entity tunables live in [`crate::config`]; the values here are the
//! behavioral constants that every agent and director shares.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 50;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- AI director ---

/// How long an evasion maneuver lasts before the agent resumes the chase (seconds).
pub const EVADE_DURATION_SECS: f64 = 2.0;

/// Minimum time between two evasion maneuvers (seconds).
pub const EVASION_COOLDOWN_SECS: f64 = 3.0;

/// Distance at which a patrolling agent considers its patrol point reached.
pub const PATROL_ARRIVAL_RADIUS: f64 = 20.0;

/// Look-ahead used when chasing a moving target (seconds).
pub const CHASE_PREDICTION_SECS: f64 = 0.5;

/// Below this fraction of the optimal range an attacking agent backs off.
pub const RETREAT_RANGE_FACTOR: f64 = 0.8;

/// Above this fraction of the optimal range an attacking agent closes in.
pub const APPROACH_RANGE_FACTOR: f64 = 1.2;

/// How far ahead of itself a retreating agent aims its retreat point.
pub const RETREAT_STEP_DISTANCE: f64 = 50.0;

/// How far an evading agent projects its evasion point.
pub const EVADE_STEP_DISTANCE: f64 = 100.0;

/// Orbit rate around the target while holding the optimal range (degrees/second).
pub const ORBIT_RATE_DEG_PER_SEC: f64 = 30.0;

/// Aim turn rate relative to the steering turn rate.
pub const AIM_TURN_FACTOR: f64 = 1.5;

// Speed caps per behavior, as fractions of the agent's move speed.
pub const PATROL_SPEED_FACTOR: f64 = 0.5;
pub const RETREAT_SPEED_FACTOR: f64 = 0.7;
pub const APPROACH_SPEED_FACTOR: f64 = 0.8;
pub const ORBIT_SPEED_FACTOR: f64 = 0.6;
pub const EVADE_SPEED_FACTOR: f64 = 1.2;

// --- Spawning ---

/// Jitter radius around a fixed spawn point, as a fraction of the spawn radius.
pub const SPAWN_POINT_JITTER_FACTOR: f64 = 0.3;

/// Height band for spawns placed around the player (meters above/below).
pub const PLAYER_RELATIVE_SPAWN_HEIGHT: f64 = 20.0;

// --- Player ship ---

/// Minimum squared speed before the player ship auto-aligns to its velocity.
pub const ALIGN_MIN_SPEED_SQ: f64 = 0.1;

// --- Collision layers ---

pub const LAYER_PLAYER: u32 = 1 << 1;
pub const LAYER_ENEMY: u32 = 1 << 2;
pub const LAYER_ALL: u32 = u32::MAX;

// --- Display ---

/// Maximum number of alerts carried in a snapshot.
pub const MAX_ALERTS: usize = 16;
