//! Agent AI system: runs the AI director for every agent each tick.
//!
//! Targets are weak references: each tick the stored id is resolved against
//! the world, and an agent whose target is gone rebinds to the player when
//! allowed. Shots requested by the director are resolved after every agent
//! has moved, each hardpoint firing its own ray.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_ai::behavior::{tick_agent, TargetInfo};
use skirmish_combat::resolver::Shot;
use skirmish_combat::vitality::Vitality;
use skirmish_core::components::{Agent, AgentBrain, Hardpoints, Kinematics};
use skirmish_core::config::AgentConfig;
use skirmish_core::constants::LAYER_ALL;
use skirmish_core::events::CombatEvent;
use skirmish_core::types::EntityId;

use crate::physics::ColliderSet;
use crate::systems::combat::fire_shot;
use crate::world_setup::{entity_id, resolve};

/// Run the AI director for every agent, then resolve the shots it fired.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    colliders: &mut ColliderSet,
    rng: &mut ChaCha8Rng,
    player: Option<Entity>,
    now: f64,
    dt: f64,
    events: &mut Vec<CombatEvent>,
) {
    let targets = resolve_targets(world, player);

    let mut shots: Vec<(Entity, Shot)> = Vec::new();
    for (entity, target) in targets {
        let Ok((brain, kin, vitality, config, hardpoints)) = world.query_one_mut::<(
            &mut AgentBrain,
            &mut Kinematics,
            &Vitality,
            &AgentConfig,
            &Hardpoints,
        )>(entity) else {
            continue;
        };

        let tick = tick_agent(brain, kin, vitality.is_dead(), target, config, now, dt, rng);
        if let Some((from, to)) = tick.transition {
            log::debug!("agent {} {:?} -> {:?}", entity_id(entity), from, to);
        }
        if !tick.fire {
            continue;
        }

        let pose = kin.pose();
        let shot = |origin| Shot {
            origin,
            direction: pose.forward(),
            range: config.weapon_range,
            damage: config.weapon_damage,
            team: vitality.team(),
            layers: LAYER_ALL,
        };
        if hardpoints.offsets.is_empty() {
            shots.push((entity, shot(pose.position)));
        } else {
            for offset in &hardpoints.offsets {
                shots.push((entity, shot(pose.transform_point(*offset))));
            }
        }
    }

    for (shooter, shot) in shots {
        // An agent killed earlier in this volley no longer fires.
        let alive = world
            .get::<&Vitality>(shooter)
            .map(|v| !v.is_dead())
            .unwrap_or(false);
        if alive {
            fire_shot(world, colliders, shooter, &shot, now, events);
        }
    }
}

/// Re-resolve every agent's target, rebinding lost targets to the player
/// when the agent auto-acquires. Returns what each agent knows this tick.
fn resolve_targets(world: &mut World, player: Option<Entity>) -> Vec<(Entity, Option<TargetInfo>)> {
    let player = player.filter(|p| world.contains(*p));

    let stored: Vec<(Entity, Option<EntityId>, bool)> = world
        .query::<(&Agent, &AgentBrain, &AgentConfig)>()
        .iter()
        .map(|(entity, (_agent, brain, config))| (entity, brain.target, config.auto_acquire_player))
        .collect();

    let mut resolved = Vec::with_capacity(stored.len());
    for (entity, id, auto_acquire) in stored {
        let mut target = id.and_then(|id| resolve(world, id));
        if target.is_none() && auto_acquire && player.is_some() {
            target = player;
            if let Ok(mut brain) = world.get::<&mut AgentBrain>(entity) {
                brain.target = player.map(entity_id);
            }
        }
        let info = target.and_then(|t| {
            let kin = world.get::<&Kinematics>(t).ok()?;
            Some(TargetInfo {
                position: kin.position,
                velocity: Some(kin.velocity),
            })
        });
        resolved.push((entity, info));
    }
    resolved
}
