//! Steering primitive shared by every AI behavior.
//!
//! A body is turned toward a point at a bounded angular rate, pushed along
//! its new forward axis, and its speed clamped to a behavior-specific cap.
//! Integration of position is left to whoever owns the body.

use glam::{DQuat, DVec3};

use skirmish_core::components::Kinematics;
use skirmish_core::constants::AIM_TURN_FACTOR;
use skirmish_core::types::{angle_between_deg, look_rotation, rotate_towards};

/// Movement capability an agent steers through.
pub trait SteeringBody {
    fn position(&self) -> DVec3;
    fn rotation(&self) -> DQuat;
    fn velocity(&self) -> DVec3;
    fn set_rotation(&mut self, rotation: DQuat);
    fn set_velocity(&mut self, velocity: DVec3);

    fn forward(&self) -> DVec3 {
        self.rotation() * DVec3::Z
    }
}

impl SteeringBody for Kinematics {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn rotation(&self) -> DQuat {
        self.rotation
    }

    fn velocity(&self) -> DVec3 {
        self.velocity
    }

    fn set_rotation(&mut self, rotation: DQuat) {
        self.rotation = rotation;
    }

    fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = velocity;
    }
}

/// Turn limits and thrust for one steering call.
#[derive(Debug, Clone, Copy)]
pub struct SteeringParams {
    pub turn_speed_deg: f64,
    pub acceleration: f64,
    pub max_speed: f64,
}

/// Turn `body` to face `target`, by at most `turn_speed_deg * dt` degrees.
fn turn<B: SteeringBody + ?Sized>(body: &mut B, target: DVec3, turn_speed_deg: f64, dt: f64) {
    let Some(wanted) = look_rotation(target - body.position(), DVec3::Y) else {
        return;
    };
    let step = (turn_speed_deg * dt).to_radians();
    body.set_rotation(rotate_towards(body.rotation(), wanted, step));
}

/// Steer toward `target`: turn, thrust forward, clamp speed.
pub fn steer_towards<B: SteeringBody + ?Sized>(
    body: &mut B,
    target: DVec3,
    params: SteeringParams,
    dt: f64,
) {
    turn(body, target, params.turn_speed_deg, dt);

    let mut velocity = body.velocity() + body.forward() * params.acceleration * dt;
    if velocity.length() > params.max_speed {
        velocity = velocity.normalize_or_zero() * params.max_speed;
    }
    body.set_velocity(velocity);
}

/// Turn toward `target` without thrust, faster than movement steering.
pub fn aim_at<B: SteeringBody + ?Sized>(body: &mut B, target: DVec3, turn_speed_deg: f64, dt: f64) {
    turn(body, target, turn_speed_deg * AIM_TURN_FACTOR, dt);
}

/// Where a target will be `secs` from now at its current velocity.
/// Without a known velocity the current position is used.
pub fn predict_position(position: DVec3, velocity: Option<DVec3>, secs: f64) -> DVec3 {
    match velocity {
        Some(v) => position + v * secs,
        None => position,
    }
}

/// Whether `target` lies within `tolerance_deg` of the body's forward axis.
pub fn target_in_sights<B: SteeringBody + ?Sized>(body: &B, target: DVec3, tolerance_deg: f64) -> bool {
    let to_target = target - body.position();
    if to_target.length_squared() == 0.0 {
        return false;
    }
    angle_between_deg(body.forward(), to_target) < tolerance_deg
}
