//! Agent combat state machine.
//!
//! Pure function that decides an agent's next state from its distance to the
//! target, its evasion history and one random draw. No ECS dependency;
//! operates on plain data.
//!
//! Evaluation order is fixed: a dead agent is skipped, a missing or
//! out-of-range target forces Patrol, an evasion in progress runs to the end
//! of its duration, then the probabilistic evasion check runs before the
//! range-based Attack/Chase choice. The evasion check can preempt an Attack
//! but never guarantees it.

use glam::DVec3;
use rand::Rng;

use skirmish_core::components::AgentBrain;
use skirmish_core::config::AgentConfig;
use skirmish_core::constants::{EVADE_DURATION_SECS, EVASION_COOLDOWN_SECS};
use skirmish_core::enums::AiState;

use crate::sampling::on_unit_sphere;

/// Input to the state machine for a single agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentContext {
    pub state: AiState,
    /// Seconds spent in the current state, this tick included.
    pub state_timer_secs: f64,
    pub dead: bool,
    /// `None` when the agent has no resolvable target.
    pub distance_to_target: Option<f64>,
    pub last_evasion_secs: Option<f64>,
    pub now: f64,
}

/// Output from the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentUpdate {
    pub new_state: AiState,
    pub state_changed: bool,
    /// Direction of an evasion that begins this tick.
    pub evasion: Option<DVec3>,
}

impl AgentUpdate {
    fn stay(state: AiState) -> Self {
        Self {
            new_state: state,
            state_changed: false,
            evasion: None,
        }
    }

    fn to(from: AiState, to: AiState) -> Self {
        Self {
            new_state: to,
            state_changed: from != to,
            evasion: None,
        }
    }
}

/// Evaluate the state machine for one agent.
pub fn evaluate<R: Rng + ?Sized>(ctx: &AgentContext, config: &AgentConfig, rng: &mut R) -> AgentUpdate {
    if ctx.dead {
        return AgentUpdate::stay(ctx.state);
    }

    let Some(distance) = ctx.distance_to_target else {
        return AgentUpdate::to(ctx.state, AiState::Patrol);
    };
    if distance > config.detection_range {
        return AgentUpdate::to(ctx.state, AiState::Patrol);
    }

    if ctx.state == AiState::Evade {
        if ctx.state_timer_secs > EVADE_DURATION_SECS {
            return AgentUpdate::to(ctx.state, AiState::Chase);
        }
        return AgentUpdate::stay(ctx.state);
    }

    if distance < config.evasion_distance
        && rng.gen::<f64>() < config.evasion_chance
        && evasion_ready(ctx.last_evasion_secs, ctx.now)
    {
        return AgentUpdate {
            new_state: AiState::Evade,
            state_changed: true,
            evasion: Some(on_unit_sphere(rng)),
        };
    }

    if distance <= config.attack_range {
        AgentUpdate::to(ctx.state, AiState::Attack)
    } else {
        AgentUpdate::to(ctx.state, AiState::Chase)
    }
}

/// Whether the evasion cooldown has elapsed. An agent that never evaded may.
pub fn evasion_ready(last_evasion_secs: Option<f64>, now: f64) -> bool {
    match last_evasion_secs {
        Some(at) => now - at >= EVASION_COOLDOWN_SECS,
        None => true,
    }
}

/// Write an update back into the agent's brain.
pub fn apply(brain: &mut AgentBrain, update: &AgentUpdate, now: f64) {
    brain.state = update.new_state;
    if let Some(direction) = update.evasion {
        brain.state_timer_secs = 0.0;
        brain.last_evasion_secs = Some(now);
        brain.evasion_direction = direction;
    }
}
