//! Kinematic integration system.
//!
//! Applies linear damping and then position += velocity * dt for every
//! present body. Bodies whose presence is disabled (dead) stay frozen.

use hecs::World;

use skirmish_core::components::{Kinematics, Presence};

/// Run kinematic integration for all entities with Kinematics.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (kin, presence)) in world.query_mut::<(&mut Kinematics, Option<&Presence>)>() {
        if presence.is_some_and(|p| !p.enabled) {
            continue;
        }
        kin.velocity *= 1.0 / (1.0 + kin.linear_damping * dt);
        kin.position += kin.velocity * dt;
    }
}
