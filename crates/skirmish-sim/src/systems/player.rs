//! Player ship system: flight model and gun.
//!
//! Applies the latest `PlayerControl` input to the ship's kinematics, then
//! pulls the trigger if held. A dead ship ignores input.

use glam::{DQuat, DVec3, EulerRot};
use hecs::{Entity, World};

use skirmish_combat::resolver::Shot;
use skirmish_combat::vitality::Vitality;
use skirmish_combat::weapon::{TriggerOutcome, Weapon};
use skirmish_core::components::{Hardpoints, Kinematics, Player, PlayerControl};
use skirmish_core::config::PlayerShipConfig;
use skirmish_core::constants::{ALIGN_MIN_SPEED_SQ, LAYER_ALL};
use skirmish_core::enums::Team;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::look_rotation;

use crate::physics::ColliderSet;
use crate::scheduler::{Action, Scheduler};
use crate::systems::combat::fire_shot;
use crate::world_setup::entity_id;

/// Integrate pilot input into the player's rotation and velocity.
pub fn run(world: &mut World, config: &PlayerShipConfig, dt: f64) {
    for (_entity, (_player, control, kin, vitality)) in
        world.query_mut::<(&Player, &PlayerControl, &mut Kinematics, &Vitality)>()
    {
        if vitality.is_dead() {
            continue;
        }
        fly(kin, control, config, dt);
    }
}

/// One step of the flight model.
pub fn fly(kin: &mut Kinematics, control: &PlayerControl, config: &PlayerShipConfig, dt: f64) {
    let turn = DQuat::from_euler(
        EulerRot::YXZ,
        (control.turn.y * config.yaw_speed_deg * dt).to_radians(),
        (control.turn.x * config.pitch_speed_deg * dt).to_radians(),
        (control.turn.z * config.roll_speed_deg * dt).to_radians(),
    );
    kin.rotation = (kin.rotation * turn).normalize();

    let boost = if control.boost { config.boost_multiplier } else { 1.0 };
    let local = DVec3::new(
        control.thrust.x * config.strafe_acceleration,
        control.thrust.y * config.vertical_acceleration,
        control.thrust.z * config.forward_acceleration,
    ) * boost;
    kin.velocity += kin.rotation * local * dt;
    if kin.velocity.length() > config.max_speed {
        kin.velocity = kin.velocity.normalize_or_zero() * config.max_speed;
    }

    if config.align_to_velocity && kin.velocity.length_squared() > ALIGN_MIN_SPEED_SQ {
        if let Some(heading) = look_rotation(kin.velocity, kin.rotation * DVec3::Y) {
            let t = (config.align_lerp * dt).clamp(0.0, 1.0);
            kin.rotation = kin.rotation.slerp(heading, t).normalize();
        }
    }
}

/// Fire the player's gun while the trigger is held.
pub fn fire(
    world: &mut World,
    colliders: &mut ColliderSet,
    scheduler: &mut Scheduler<Action>,
    now: f64,
    events: &mut Vec<CombatEvent>,
) {
    let mut shots: Vec<(Entity, Shot)> = Vec::new();

    for (entity, (_player, control, kin, vitality, weapon, hardpoints)) in world.query_mut::<(
        &Player,
        &PlayerControl,
        &Kinematics,
        &Vitality,
        &mut Weapon,
        &Hardpoints,
    )>() {
        if !control.trigger_held || vitality.is_dead() {
            continue;
        }
        match weapon.pull_trigger(now, hardpoints.offsets.len()) {
            TriggerOutcome::Fired { barrel } => {
                let offset = hardpoints.offsets.get(barrel).copied().unwrap_or(DVec3::ZERO);
                shots.push((
                    entity,
                    Shot {
                        origin: kin.pose().transform_point(offset),
                        direction: kin.forward(),
                        range: weapon.config().range,
                        damage: weapon.config().damage,
                        team: Team::Player,
                        layers: LAYER_ALL,
                    },
                ));
            }
            TriggerOutcome::ReloadStarted => {
                scheduler.schedule(now + weapon.reload_secs(), Action::FinishReload { entity });
                events.push(CombatEvent::ReloadStarted {
                    entity: entity_id(entity),
                });
            }
            TriggerOutcome::CoolingDown | TriggerOutcome::Reloading => {}
        }
    }

    for (shooter, shot) in shots {
        fire_shot(world, colliders, shooter, &shot, now, events);
    }
}

/// Start a manual reload of `entity`'s gun.
pub fn reload(
    world: &mut World,
    entity: Entity,
    scheduler: &mut Scheduler<Action>,
    now: f64,
    events: &mut Vec<CombatEvent>,
) {
    let Ok(mut weapon) = world.get::<&mut Weapon>(entity) else {
        return;
    };
    if weapon.begin_reload() {
        scheduler.schedule(now + weapon.reload_secs(), Action::FinishReload { entity });
        events.push(CombatEvent::ReloadStarted {
            entity: entity_id(entity),
        });
    }
}

/// Complete a reload scheduled earlier.
pub fn finish_reload(world: &mut World, entity: Entity, events: &mut Vec<CombatEvent>) {
    if let Ok(mut weapon) = world.get::<&mut Weapon>(entity) {
        weapon.finish_reload();
        events.push(CombatEvent::ReloadFinished {
            entity: entity_id(entity),
        });
    }
}
