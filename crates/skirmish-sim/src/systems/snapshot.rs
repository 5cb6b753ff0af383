//! Read-only view of the world handed out after every tick.

use hecs::World;

use skirmish_combat::vitality::Vitality;
use skirmish_combat::weapon::Weapon;
use skirmish_core::components::*;
use skirmish_core::enums::GamePhase;
use skirmish_core::events::{Alert, CombatEvent};
use skirmish_core::state::*;
use skirmish_core::types::SimTime;

use crate::world_setup::entity_id;

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    waves: WaveView,
    events: Vec<CombatEvent>,
    alerts: Vec<Alert>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        player: build_player(world),
        agents: build_agents(world),
        waves,
        events,
        alerts,
    }
}

fn build_player(world: &World) -> Option<PlayerView> {
    world
        .query::<(&Player, &Kinematics, &Vitality, &Weapon)>()
        .iter()
        .next()
        .map(|(entity, (_, kin, vitality, weapon))| PlayerView {
            id: entity_id(entity),
            pose: kin.pose(),
            speed: kin.velocity.length(),
            health_fraction: vitality.health_fraction(),
            shield_fraction: vitality.shield_fraction(),
            ammo: weapon.ammo(),
            magazine_size: weapon.magazine_size(),
            reloading: weapon.is_reloading(),
            dead: vitality.is_dead(),
        })
}

/// Agents sorted by id so snapshots are stable across runs.
fn build_agents(world: &World) -> Vec<AgentView> {
    let mut agents: Vec<AgentView> = world
        .query::<(&Agent, &Kinematics, &Vitality, &AgentBrain, &WaveMember)>()
        .iter()
        .map(|(entity, (_, kin, vitality, brain, member))| AgentView {
            id: entity_id(entity),
            pose: kin.pose(),
            state: brain.state,
            wave: member.wave,
            health_fraction: vitality.health_fraction(),
            dead: vitality.is_dead(),
        })
        .collect();
    agents.sort_by_key(|a| a.id);
    agents
}
