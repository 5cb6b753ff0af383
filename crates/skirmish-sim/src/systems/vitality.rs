//! Vitality lifecycle: shield regeneration, death, respawn and destruction.
//!
//! A death disables the entity's presence and schedules exactly one
//! follow-up, chosen by the entity's `DeathPolicy`: a respawn at its spawn
//! pose or its removal from the world.

use glam::DVec3;
use hecs::{Entity, World};

use skirmish_combat::vitality::Vitality;
use skirmish_core::components::{Kinematics, Presence};
use skirmish_core::config::DeathPolicy;
use skirmish_core::events::CombatEvent;

use crate::scheduler::{Action, Scheduler};
use crate::systems::combat::to_combat_event;
use crate::world_setup::{entity_id, resolve};

/// Passive shield regeneration for every living entity.
pub fn regen(world: &mut World, now: f64, dt: f64, events: &mut Vec<CombatEvent>) {
    let mut changes = Vec::new();
    for (entity, vitality) in world.query_mut::<&mut Vitality>() {
        vitality.tick_regen(now, dt, &mut changes);
        let team = vitality.team();
        events.extend(
            changes
                .drain(..)
                .map(|change| to_combat_event(entity_id(entity), team, change)),
        );
    }
}

/// Entities whose `Died` event appears in `events`, in order.
pub fn deaths_in(world: &World, events: &[CombatEvent]) -> Vec<Entity> {
    events
        .iter()
        .filter_map(|event| match event {
            CombatEvent::Died { entity, .. } => resolve(world, *entity),
            _ => None,
        })
        .collect()
}

/// Take a freshly dead entity out of play and schedule what follows.
pub fn on_death(world: &mut World, entity: Entity, scheduler: &mut Scheduler<Action>, now: f64) {
    let Ok(policy) = world.get::<&Vitality>(entity).map(|v| v.death_policy()) else {
        return;
    };
    set_presence(world, entity, false);

    match policy {
        DeathPolicy::Respawn { delay_secs } => {
            scheduler.schedule(now + delay_secs, Action::Respawn { entity });
        }
        DeathPolicy::Destroy { delay_secs } => {
            scheduler.schedule(now + delay_secs, Action::Destroy { entity });
        }
    }
}

/// Bring a dead entity back at its spawn pose.
pub fn respawn(world: &mut World, entity: Entity, events: &mut Vec<CombatEvent>) {
    let mut changes = Vec::new();
    let Ok(mut vitality) = world.get::<&mut Vitality>(entity) else {
        return;
    };
    let Some(pose) = vitality.respawn(&mut changes) else {
        return;
    };
    let team = vitality.team();
    drop(vitality);

    if let Ok(mut kin) = world.get::<&mut Kinematics>(entity) {
        kin.position = pose.position;
        kin.rotation = pose.rotation;
        kin.velocity = DVec3::ZERO;
    }
    set_presence(world, entity, true);

    log::debug!("{} respawned", entity_id(entity));
    events.extend(
        changes
            .into_iter()
            .map(|change| to_combat_event(entity_id(entity), team, change)),
    );
}

/// Queue a dead entity for removal at the end of the tick.
pub fn destroy(world: &World, entity: Entity, despawn_buffer: &mut Vec<Entity>, events: &mut Vec<CombatEvent>) {
    if world.contains(entity) {
        despawn_buffer.push(entity);
        events.push(CombatEvent::Destroyed {
            entity: entity_id(entity),
        });
    }
}

pub(crate) fn set_presence(world: &mut World, entity: Entity, enabled: bool) {
    if let Ok(mut presence) = world.get::<&mut Presence>(entity) {
        presence.enabled = enabled;
    }
}
