//! Headless simulation engine.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! fires deferred actions, runs all systems, publishes combat events and
//! produces `GameStateSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::VecDeque;

use glam::DVec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skirmish_combat::vitality::{DamageOutcome, Hit, Vitality};
use skirmish_core::commands::PlayerCommand;
use skirmish_core::components::PlayerControl;
use skirmish_core::config::{CombatConfig, ConfigError};
use skirmish_core::constants::{DT, MAX_ALERTS};
use skirmish_core::enums::GamePhase;
use skirmish_core::events::{Alert, CombatEvent};
use skirmish_core::state::GameStateSnapshot;
use skirmish_core::types::{EntityId, Pose, SimTime};

use crate::bus::{EventBus, SubscriptionId};
use crate::director::{DirectorCtx, WaveDirector};
use crate::physics::ColliderSet;
use crate::scheduler::{Action, Scheduler};
use crate::systems;
use crate::world_setup;

/// Seed plus tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed of every random draw in the simulation.
    pub seed: u64,
    pub combat: CombatConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            combat: CombatConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.combat.validate()?;
        Ok(config)
    }
}

/// Fixed-step combat simulation: world, clock, scheduler, director and observers.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    config: CombatConfig,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    scheduler: Scheduler<Action>,
    director: WaveDirector,
    bus: EventBus,
    player: Option<Entity>,
    /// Events of the tick in progress, in publication order.
    events: Vec<CombatEvent>,
    alerts: Vec<Alert>,
}

impl SimulationEngine {
    /// Engine in `Setup`, with an empty world. The configuration is not validated.
    pub fn new(config: SimConfig) -> Self {
        let combat = config.combat;
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            director: WaveDirector::new(
                combat.waves.clone(),
                combat.spawn.clone(),
                combat.enemy_template.clone(),
            ),
            config: combat,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            scheduler: Scheduler::new(),
            bus: EventBus::new(),
            player: None,
            events: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Like [`SimulationEngine::new`], rejecting invalid tuning.
    pub fn try_new(config: SimConfig) -> Result<Self, ConfigError> {
        config.combat.validate()?;
        Ok(Self::new(config))
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Register an observer for every combat event, in publication order.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&CombatEvent) + Send + 'static,
    {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        self.bus.publish(&events);

        if self.alerts.len() > MAX_ALERTS {
            let excess = self.alerts.len() - MAX_ALERTS;
            self.alerts.drain(..excess);
        }

        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            self.director.view(),
            events,
            self.alerts.clone(),
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// The hecs world, for inspection.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    pub fn scheduler(&self) -> &Scheduler<Action> {
        &self.scheduler
    }

    /// The player's ship, once the mission has started.
    pub fn player(&self) -> Option<EntityId> {
        self.player.map(world_setup::entity_id)
    }

    /// Apply damage from outside the combat resolver (hazards, collisions).
    pub fn apply_damage(&mut self, id: EntityId, hit: Hit) -> DamageOutcome {
        let Some(entity) = world_setup::resolve(&self.world, id) else {
            return DamageOutcome::Ignored;
        };
        let mark = self.events.len();
        let mut changes = Vec::new();
        let (outcome, team) = match self.world.get::<&mut Vitality>(entity) {
            Ok(mut vitality) => (vitality.take_damage(hit, self.time.elapsed_secs, &mut changes), vitality.team()),
            Err(_) => return DamageOutcome::Ignored,
        };
        self.events.extend(
            changes
                .into_iter()
                .map(|c| systems::combat::to_combat_event(id, team, c)),
        );
        self.process_deaths(mark, self.time.elapsed_secs);
        outcome
    }

    /// Kill an entity outright. Returns false if it was already dead.
    pub fn instant_kill(&mut self, id: EntityId) -> bool {
        let Some(entity) = world_setup::resolve(&self.world, id) else {
            return false;
        };
        let mark = self.events.len();
        let mut changes = Vec::new();
        let (killed, team) = match self.world.get::<&mut Vitality>(entity) {
            Ok(mut vitality) => (vitality.instant_kill(&mut changes), vitality.team()),
            Err(_) => return false,
        };
        self.events.extend(
            changes
                .into_iter()
                .map(|c| systems::combat::to_combat_event(id, team, c)),
        );
        self.process_deaths(mark, self.time.elapsed_secs);
        killed
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        let now = self.time.elapsed_secs;
        match command {
            PlayerCommand::StartMission => {
                if self.phase == GamePhase::Setup {
                    let player = world_setup::spawn_player(&mut self.world, &self.config.player, Pose::default());
                    self.player = Some(player);
                    self.director.set_player(Some(player));
                    self.phase = GamePhase::Active;
                    log::info!("mission started, player {}", world_setup::entity_id(player));
                    self.with_director(now, |director, ctx| director.begin(ctx));
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::SetThrust {
                forward,
                strafe,
                vertical,
                boost,
            } => self.update_control(|control| {
                control.thrust = DVec3::new(axis(strafe), axis(vertical), axis(forward));
                control.boost = boost;
            }),
            PlayerCommand::SetRotation { pitch, yaw, roll } => self.update_control(|control| {
                control.turn = DVec3::new(axis(pitch), axis(yaw), axis(roll));
            }),
            PlayerCommand::SetTrigger { held } => self.update_control(|control| {
                control.trigger_held = held;
            }),
            PlayerCommand::Reload => {
                if let Some(player) = self.player {
                    systems::player::reload(&mut self.world, player, &mut self.scheduler, now, &mut self.events);
                }
            }
            PlayerCommand::TriggerNextWave => {
                if self.mission_started() {
                    self.with_director(now, |director, ctx| director.trigger_next_wave(ctx));
                }
            }
            PlayerCommand::ClearEnemies => {
                if self.mission_started() {
                    self.director.clear_all_enemies(&mut self.world);
                }
            }
            PlayerCommand::ResetWaves => {
                if self.mission_started() {
                    self.with_director(now, |director, ctx| director.reset(ctx));
                    if self.phase == GamePhase::Complete {
                        self.phase = GamePhase::Active;
                    }
                }
            }
        }
    }

    fn mission_started(&self) -> bool {
        self.phase != GamePhase::Setup
    }

    fn update_control(&mut self, f: impl FnOnce(&mut PlayerControl)) {
        let Some(player) = self.player else {
            return;
        };
        if let Ok(mut control) = self.world.get::<&mut PlayerControl>(player) {
            f(&mut *control);
        }
    }

    /// Run a director operation with access to the engine state it needs.
    fn with_director<T>(&mut self, now: f64, f: impl FnOnce(&mut WaveDirector, &mut DirectorCtx<'_>) -> T) -> T {
        let mut ctx = DirectorCtx {
            world: &mut self.world,
            scheduler: &mut self.scheduler,
            rng: &mut self.rng,
            now,
            tick: self.time.tick,
            events: &mut self.events,
            alerts: &mut self.alerts,
        };
        f(&mut self.director, &mut ctx)
    }

    /// Fire every deferred action that has come due.
    fn run_due_actions(&mut self, now: f64) {
        while let Some(action) = self.scheduler.pop_due(now) {
            match action {
                Action::StartWave => self.with_director(now, |director, ctx| director.start_next_wave(ctx)),
                Action::SpawnEnemy { wave, remaining } => {
                    self.with_director(now, |director, ctx| director.spawn_step(ctx, wave, remaining))
                }
                Action::EndWaveSpawn { wave } => self.director.end_spawn(wave),
                Action::Respawn { entity } => {
                    systems::vitality::respawn(&mut self.world, entity, &mut self.events)
                }
                Action::Destroy { entity } => systems::vitality::destroy(
                    &self.world,
                    entity,
                    &mut self.despawn_buffer,
                    &mut self.events,
                ),
                Action::FinishReload { entity } => {
                    systems::player::finish_reload(&mut self.world, entity, &mut self.events)
                }
            }
        }
    }

    /// Run the death lifecycle for every `Died` event published since `from`.
    fn process_deaths(&mut self, from: usize, now: f64) {
        let dead = systems::vitality::deaths_in(&self.world, &self.events[from..]);
        if dead.is_empty() {
            return;
        }
        for &entity in &dead {
            systems::vitality::on_death(&mut self.world, entity, &mut self.scheduler, now);
        }
        self.with_director(now, |director, ctx| director.on_deaths(ctx, &dead));
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now = self.time.elapsed_secs;
        let mark = self.events.len();

        // 1. Deferred actions (wave starts, spawns, respawns, reloads)
        self.run_due_actions(now);
        // 2. Collider snapshot for this tick's rays
        let mut colliders = ColliderSet::from_world(&self.world);
        // 3. Player flight model and gun
        systems::player::run(&mut self.world, &self.config.player, DT);
        systems::player::fire(&mut self.world, &mut colliders, &mut self.scheduler, now, &mut self.events);
        // 4. AI director
        systems::agent_ai::run(
            &mut self.world,
            &mut colliders,
            &mut self.rng,
            self.player,
            now,
            DT,
            &mut self.events,
        );
        // 5. Shield regeneration
        systems::vitality::regen(&mut self.world, now, DT, &mut self.events);
        // 6. Death lifecycle and kill bookkeeping
        self.process_deaths(mark, now);
        // 7. Wave housekeeping (prune, completion)
        self.with_director(now, |director, ctx| director.update(ctx));
        // 8. Movement integration
        systems::movement::run(&mut self.world, DT);
        // 9. Cleanup (destroyed entities)
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);

        if self.director.all_waves_completed() {
            self.phase = GamePhase::Complete;
        }
    }
}

/// Clamp an input axis to [-1, 1]; non-finite input reads as centered.
fn axis(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
