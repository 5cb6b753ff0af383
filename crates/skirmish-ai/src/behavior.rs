//! Per-state agent behavior and the one-tick agent update.
//!
//! [`tick_agent`] advances the state timer, runs the state machine and then
//! the behavior of the resulting state. Firing is reported to the caller,
//! which owns the weapons and the spatial query.

use glam::{DQuat, DVec3};
use rand::Rng;

use skirmish_core::components::AgentBrain;
use skirmish_core::config::AgentConfig;
use skirmish_core::constants::*;
use skirmish_core::enums::AiState;

use crate::fsm::{self, AgentContext};
use crate::sampling::inside_unit_sphere;
use crate::steering::{aim_at, predict_position, steer_towards, target_in_sights, SteeringBody, SteeringParams};

/// What the agent knows about its target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub position: DVec3,
    /// `None` when the target has no movement body.
    pub velocity: Option<DVec3>,
}

/// Result of one agent tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentTick {
    /// State before and after, when the state machine changed it.
    pub transition: Option<(AiState, AiState)>,
    /// The agent fires every hardpoint this tick.
    pub fire: bool,
}

/// Advance one agent by one fixed step.
#[allow(clippy::too_many_arguments)]
pub fn tick_agent<B, R>(
    brain: &mut AgentBrain,
    body: &mut B,
    dead: bool,
    target: Option<TargetInfo>,
    config: &AgentConfig,
    now: f64,
    dt: f64,
    rng: &mut R,
) -> AgentTick
where
    B: SteeringBody + ?Sized,
    R: Rng + ?Sized,
{
    if dead {
        return AgentTick::default();
    }

    brain.state_timer_secs += dt;

    let ctx = AgentContext {
        state: brain.state,
        state_timer_secs: brain.state_timer_secs,
        dead,
        distance_to_target: target.map(|t| body.position().distance(t.position)),
        last_evasion_secs: brain.last_evasion_secs,
        now,
    };
    let update = fsm::evaluate(&ctx, config, rng);
    let transition = update.state_changed.then_some((brain.state, update.new_state));
    fsm::apply(brain, &update, now);

    let fire = execute(brain, body, target.as_ref(), config, now, dt, rng);
    AgentTick { transition, fire }
}

/// Run the behavior of the brain's current state. Returns true when the agent fires.
pub fn execute<B, R>(
    brain: &mut AgentBrain,
    body: &mut B,
    target: Option<&TargetInfo>,
    config: &AgentConfig,
    now: f64,
    dt: f64,
    rng: &mut R,
) -> bool
where
    B: SteeringBody + ?Sized,
    R: Rng + ?Sized,
{
    match (brain.state, target) {
        (AiState::Patrol, _) => {
            patrol(brain, body, config, dt, rng);
            false
        }
        (AiState::Chase, Some(target)) => {
            let predicted = predict_position(target.position, target.velocity, CHASE_PREDICTION_SECS);
            steer_towards(body, predicted, params(config, 1.0), dt);
            false
        }
        (AiState::Attack, Some(target)) => attack(brain, body, target.position, config, now, dt),
        (AiState::Evade, _) => {
            let point = body.position() + brain.evasion_direction * EVADE_STEP_DISTANCE;
            steer_towards(body, point, params(config, EVADE_SPEED_FACTOR), dt);
            false
        }
        // Chase and Attack never survive evaluation without a target.
        (AiState::Chase | AiState::Attack, None) => false,
    }
}

fn params(config: &AgentConfig, speed_factor: f64) -> SteeringParams {
    SteeringParams {
        turn_speed_deg: config.turn_speed_deg,
        acceleration: config.acceleration,
        max_speed: config.move_speed * speed_factor,
    }
}

/// A fresh patrol point within the patrol radius of home.
pub fn random_patrol_point<R: Rng + ?Sized>(home: DVec3, radius: f64, rng: &mut R) -> DVec3 {
    home + inside_unit_sphere(rng) * radius
}

fn patrol<B, R>(brain: &mut AgentBrain, body: &mut B, config: &AgentConfig, dt: f64, rng: &mut R)
where
    B: SteeringBody + ?Sized,
    R: Rng + ?Sized,
{
    if body.position().distance(brain.patrol_point) < PATROL_ARRIVAL_RADIUS {
        brain.patrol_point = random_patrol_point(brain.home, config.patrol_radius, rng);
        log::trace!("new patrol point {:?}", brain.patrol_point);
    }
    steer_towards(body, brain.patrol_point, params(config, PATROL_SPEED_FACTOR), dt);
}

fn attack<B>(
    brain: &mut AgentBrain,
    body: &mut B,
    target: DVec3,
    config: &AgentConfig,
    now: f64,
    dt: f64,
) -> bool
where
    B: SteeringBody + ?Sized,
{
    let position = body.position();
    let distance = position.distance(target);
    let optimal = config.optimal_attack_range;

    if distance < optimal * RETREAT_RANGE_FACTOR {
        let away = (position - target).normalize_or_zero();
        let retreat = position + away * RETREAT_STEP_DISTANCE;
        steer_towards(body, retreat, params(config, RETREAT_SPEED_FACTOR), dt);
    } else if distance > optimal * APPROACH_RANGE_FACTOR {
        steer_towards(body, target, params(config, APPROACH_SPEED_FACTOR), dt);
    } else {
        steer_towards(body, orbit_point(position, target, optimal, dt), params(config, ORBIT_SPEED_FACTOR), dt);
    }

    aim_at(body, target, config.turn_speed_deg, dt);

    if target_in_sights(body, target, config.aim_tolerance_deg) && now >= brain.next_fire_secs {
        brain.next_fire_secs = now + config.fire_interval_secs;
        return true;
    }
    false
}

/// Next point on a horizontal orbit of radius `range` around `target`.
pub fn orbit_point(position: DVec3, target: DVec3, range: f64, dt: f64) -> DVec3 {
    let offset = (position - target).normalize_or_zero();
    let step = DQuat::from_rotation_y((ORBIT_RATE_DEG_PER_SEC * dt).to_radians());
    target + step * offset * range
}
