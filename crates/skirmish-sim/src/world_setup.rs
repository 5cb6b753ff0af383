//! Entity spawn factories for setting up the simulation world.
//!
//! Creates the player ship and enemy agents with appropriate component
//! bundles, and converts between ECS handles and the `EntityId`s carried in
//! components, events and snapshots.

use hecs::{Entity, World};
use rand::Rng;

use skirmish_ai::behavior::random_patrol_point;
use skirmish_combat::vitality::Vitality;
use skirmish_combat::weapon::Weapon;
use skirmish_core::components::*;
use skirmish_core::config::{AgentTemplate, PlayerShipConfig};
use skirmish_core::constants::{LAYER_ENEMY, LAYER_PLAYER};
use skirmish_core::enums::Team;
use skirmish_core::types::{EntityId, Pose};

/// Stable id for an entity handle.
pub fn entity_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Resolve an id back to a live entity. Fails once the entity is despawned.
pub fn resolve(world: &World, id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0).filter(|entity| world.contains(*entity))
}

/// Spawn the player's ship at `pose`.
pub fn spawn_player(world: &mut World, config: &PlayerShipConfig, pose: Pose) -> Entity {
    world.spawn((
        Player,
        Kinematics::at_rest(pose, config.drag),
        Collider {
            radius: config.collider_radius,
            layers: LAYER_PLAYER,
        },
        Presence { enabled: true },
        Hardpoints {
            offsets: config.hardpoints.clone(),
        },
        Vitality::new(&config.vitality, Team::Player, pose),
        Weapon::new(config.weapon.clone()),
        PlayerControl::default(),
    ))
}

/// Spawn one enemy agent from `template`, bound to `target` when given.
pub fn spawn_agent<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    template: &AgentTemplate,
    pose: Pose,
    wave: u32,
    target: Option<Entity>,
) -> Entity {
    let patrol_point = random_patrol_point(pose.position, template.agent.patrol_radius, rng);
    let mut brain = AgentBrain::new(pose.position, patrol_point);
    brain.target = target.map(entity_id);

    world.spawn((
        Agent,
        Kinematics::at_rest(pose, template.agent.linear_damping),
        Collider {
            radius: template.collider_radius,
            layers: LAYER_ENEMY,
        },
        Presence { enabled: true },
        Hardpoints {
            offsets: template.hardpoints.clone(),
        },
        Vitality::new(&template.vitality, Team::Enemy, pose),
        brain,
        template.agent.clone(),
        WaveMember { wave },
    ))
}
