//! Shot resolution against the world.
//!
//! Wraps the combat resolver: rays are cast through the tick's collider
//! snapshot, damage lands on the hit entity's `Vitality` component, and the
//! resulting notifications become `CombatEvent`s. A killed ship leaves the
//! snapshot at once, so later rays of the same tick pass through it.

use hecs::{Entity, World};

use skirmish_combat::resolver::{resolve_shot, Shot, ShotReport};
use skirmish_combat::vitality::{DamageOutcome, Vitality, VitalityEvent};
use skirmish_core::enums::Team;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::EntityId;

use crate::physics::{ColliderSet, WorldVitality};
use crate::systems::vitality::set_presence;
use crate::world_setup::entity_id;

/// Fire one shot from `shooter` and record what happened.
pub fn fire_shot(
    world: &mut World,
    colliders: &mut ColliderSet,
    shooter: Entity,
    shot: &Shot,
    now: f64,
    events: &mut Vec<CombatEvent>,
) -> ShotReport<Entity> {
    let mut changes = Vec::new();
    let report = resolve_shot(&*colliders, &mut WorldVitality(&mut *world), shot, now, &mut changes);

    events.push(CombatEvent::ShotFired {
        shooter: entity_id(shooter),
        origin: shot.origin,
        end: report.end,
        hit: report.is_hit(),
    });
    if let Some(hit) = report.hit {
        log::trace!(
            "{} hit {} at {:.1} m",
            entity_id(shooter),
            entity_id(hit.entity),
            hit.distance
        );
        if report.outcome == DamageOutcome::Killed {
            colliders.remove(hit.entity);
            set_presence(world, hit.entity, false);
        }
    }

    for (entity, change) in changes {
        let team = world
            .get::<&Vitality>(entity)
            .map(|v| v.team())
            .unwrap_or_default();
        events.push(to_combat_event(entity_id(entity), team, change));
    }
    report
}

/// Tag a vitality notification with its entity.
pub fn to_combat_event(entity: EntityId, team: Team, event: VitalityEvent) -> CombatEvent {
    match event {
        VitalityEvent::HealthChanged(fraction) => CombatEvent::HealthChanged { entity, fraction },
        VitalityEvent::ShieldChanged(fraction) => CombatEvent::ShieldChanged { entity, fraction },
        VitalityEvent::Damaged {
            amount,
            hit_point,
            hit_direction,
        } => CombatEvent::Damaged {
            entity,
            amount,
            hit_point,
            hit_direction,
        },
        VitalityEvent::Died => CombatEvent::Died { entity, team },
        VitalityEvent::Respawned => CombatEvent::Respawned { entity },
    }
}
