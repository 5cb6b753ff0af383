//! Wave director: enemy wave progression and population tracking.
//!
//! The director decides when a wave starts, how many enemies it holds and
//! where each one appears. It tracks the agents it spawned through weak
//! handles; the world owns their lifetime. A wave is complete once its spawn
//! sequence has ended and every tracked agent is dead or gone, which
//! schedules the next wave after the inter-wave delay.
//!
//! Progression: `Idle → Spawning → (Idle | AllComplete)`. A new wave never
//! starts while one is still spawning or after the wave cap was reached.

use glam::{DQuat, DVec3};
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_ai::sampling::{inside_unit_sphere, on_unit_sphere};
use skirmish_core::components::Kinematics;
use skirmish_core::config::{AgentTemplate, SpawnConfig, WaveConfig};
use skirmish_core::constants::{PLAYER_RELATIVE_SPAWN_HEIGHT, SPAWN_POINT_JITTER_FACTOR};
use skirmish_core::enums::{AlertLevel, WavePhase};
use skirmish_core::events::{Alert, CombatEvent};
use skirmish_core::state::WaveView;
use skirmish_core::types::{look_rotation, Pose};

use crate::scheduler::{Action, Scheduler};
use crate::world_setup::{entity_id, spawn_agent};

/// Everything a director operation may touch.
pub struct DirectorCtx<'a> {
    pub world: &'a mut World,
    pub scheduler: &'a mut Scheduler<Action>,
    pub rng: &'a mut ChaCha8Rng,
    pub now: f64,
    pub tick: u64,
    pub events: &'a mut Vec<CombatEvent>,
    pub alerts: &'a mut Vec<Alert>,
}

impl DirectorCtx<'_> {
    fn alert(&mut self, level: AlertLevel, message: String) {
        self.alerts.push(Alert {
            level,
            message,
            tick: self.tick,
        });
    }
}

/// Counters reported by [`WaveDirector::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveStats {
    pub wave: u32,
    pub active: u32,
    pub killed: u32,
    pub spawned: u32,
    pub spawning: bool,
    pub all_complete: bool,
}

#[derive(Debug, Clone)]
pub struct WaveDirector {
    waves: WaveConfig,
    spawn: SpawnConfig,
    template: Option<AgentTemplate>,
    player: Option<Entity>,

    wave: u32,
    total_spawned: u32,
    total_killed: u32,
    active: Vec<Entity>,
    spawning: bool,
    all_complete: bool,
    /// Completion of the current wave has been handled.
    completion_handled: bool,
}

impl WaveDirector {
    pub fn new(waves: WaveConfig, spawn: SpawnConfig, template: Option<AgentTemplate>) -> Self {
        Self {
            waves,
            spawn,
            template,
            player: None,
            wave: 0,
            total_spawned: 0,
            total_killed: 0,
            active: Vec::new(),
            spawning: false,
            all_complete: false,
            completion_handled: false,
        }
    }

    /// Entity every spawned agent targets and spawns are placed around.
    pub fn set_player(&mut self, player: Option<Entity>) {
        self.player = player;
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn all_waves_completed(&self) -> bool {
        self.all_complete
    }

    /// Agents of the current population, in spawn order.
    pub fn active_agents(&self) -> &[Entity] {
        &self.active
    }

    /// Enemies alive or still to come in the current wave.
    pub fn is_wave_active(&self) -> bool {
        !self.active.is_empty() || self.spawning
    }

    pub fn stats(&self) -> WaveStats {
        WaveStats {
            wave: self.wave,
            active: self.active.len() as u32,
            killed: self.total_killed,
            spawned: self.total_spawned,
            spawning: self.spawning,
            all_complete: self.all_complete,
        }
    }

    pub fn stats_line(&self) -> String {
        let stats = self.stats();
        format!(
            "Wave: {} | Active: {} | Killed: {} | Total Spawned: {}",
            stats.wave, stats.active, stats.killed, stats.spawned
        )
    }

    pub fn phase(&self) -> WavePhase {
        if self.all_complete {
            WavePhase::AllComplete
        } else if self.spawning {
            WavePhase::Spawning
        } else {
            WavePhase::Idle
        }
    }

    pub fn view(&self) -> WaveView {
        let stats = self.stats();
        WaveView {
            phase: self.phase(),
            wave: stats.wave,
            active: stats.active,
            killed: stats.killed,
            spawned: stats.spawned,
        }
    }

    /// Start the wave cycle: the first wave comes after the initial delay
    /// when progression is automatic. An empty spawn point list is reported
    /// here once; spawns then fall back to player-relative placement.
    pub fn begin(&mut self, ctx: &mut DirectorCtx) {
        if self.spawn.use_spawn_points && self.spawn.spawn_points.is_empty() {
            log::warn!("no spawn points configured, placing enemies around the player");
            ctx.alert(
                AlertLevel::Warning,
                "No spawn points configured; using player-relative spawns".to_string(),
            );
        }
        if self.waves.auto_start {
            ctx.scheduler
                .schedule(ctx.now + self.waves.first_wave_delay_secs, Action::StartWave);
        }
    }

    pub fn start_next_wave(&mut self, ctx: &mut DirectorCtx) {
        if self.all_complete || self.spawning {
            return;
        }
        if self.waves.max_waves > 0 && self.wave >= self.waves.max_waves {
            self.all_complete = true;
            log::info!("all {} waves completed", self.wave);
            ctx.events.push(CombatEvent::AllWavesCompleted { waves: self.wave });
            return;
        }
        if self.template.is_none() {
            self.report_missing_template(ctx);
            return;
        }

        self.wave += 1;
        self.spawning = true;
        self.completion_handled = false;
        let count = self.waves.enemy_count(self.wave);
        log::info!("wave {} started with {} enemies", self.wave, count);
        ctx.events.push(CombatEvent::WaveStarted {
            wave: self.wave,
            enemy_count: count,
        });

        if count == 0 {
            self.spawning = false;
        } else if self.waves.spawn_all_at_once {
            for _ in 0..count {
                self.spawn_enemy(ctx);
            }
            self.spawning = false;
        } else {
            self.spawn_step(ctx, self.wave, count);
        }
    }

    /// Skip the inter-wave delay.
    pub fn trigger_next_wave(&mut self, ctx: &mut DirectorCtx) {
        ctx.scheduler.cancel_where(|a| matches!(a, Action::StartWave));
        self.start_next_wave(ctx);
    }

    /// Spawn one enemy of a staggered sequence and schedule the rest.
    pub fn spawn_step(&mut self, ctx: &mut DirectorCtx, wave: u32, remaining: u32) {
        if wave != self.wave || !self.spawning || remaining == 0 {
            return;
        }
        self.spawn_enemy(ctx);
        let due = ctx.now + self.waves.spawn_interval_secs;
        if remaining > 1 {
            ctx.scheduler.schedule(
                due,
                Action::SpawnEnemy {
                    wave,
                    remaining: remaining - 1,
                },
            );
        } else {
            ctx.scheduler.schedule(due, Action::EndWaveSpawn { wave });
        }
    }

    pub fn end_spawn(&mut self, wave: u32) {
        if wave == self.wave {
            self.spawning = false;
        }
    }

    /// Spawn a single enemy from the template. A missing template is
    /// reported and nothing is spawned.
    pub fn spawn_enemy(&mut self, ctx: &mut DirectorCtx) -> Option<Entity> {
        let Some(template) = self.template.as_ref() else {
            self.report_missing_template(ctx);
            return None;
        };
        let pose = self.spawn_pose(ctx);
        let entity = spawn_agent(ctx.world, ctx.rng, template, pose, self.wave, self.player);

        self.active.push(entity);
        self.total_spawned += 1;
        log::debug!("spawned {} for wave {}", entity_id(entity), self.wave);
        ctx.events.push(CombatEvent::EnemySpawned {
            entity: entity_id(entity),
            wave: self.wave,
        });
        Some(entity)
    }

    /// Count tracked agents that died this tick as kills.
    pub fn on_deaths(&mut self, ctx: &mut DirectorCtx, dead: &[Entity]) {
        for &entity in dead {
            let Some(index) = self.active.iter().position(|e| *e == entity) else {
                continue;
            };
            self.active.remove(index);
            self.total_killed += 1;
            let remaining = self.active.len() as u32;
            log::info!("enemy {} killed, {} remaining", entity_id(entity), remaining);
            ctx.events.push(CombatEvent::EnemyKilled {
                entity: entity_id(entity),
                remaining,
            });
        }
    }

    /// Per-tick housekeeping: prune despawned agents and handle wave completion.
    pub fn update(&mut self, ctx: &mut DirectorCtx) {
        let world = &*ctx.world;
        self.active.retain(|e| world.contains(*e));

        if self.spawning
            || !self.active.is_empty()
            || self.wave == 0
            || self.all_complete
            || self.completion_handled
        {
            return;
        }

        self.completion_handled = true;
        log::info!("wave {} completed", self.wave);
        ctx.events.push(CombatEvent::WaveCompleted { wave: self.wave });

        if !self.waves.auto_start {
            return;
        }
        if self.waves.max_waves > 0 && self.wave >= self.waves.max_waves {
            self.start_next_wave(ctx);
        } else {
            ctx.scheduler
                .schedule(ctx.now + self.waves.time_between_waves_secs, Action::StartWave);
        }
    }

    /// Despawn the whole current population. Not counted as kills.
    pub fn clear_all_enemies(&mut self, world: &mut World) {
        for entity in self.active.drain(..) {
            let _ = world.despawn(entity);
        }
    }

    /// Clear enemies, cancel pending wave actions, zero counters and restart
    /// the cycle from the initial delay.
    pub fn reset(&mut self, ctx: &mut DirectorCtx) {
        self.clear_all_enemies(ctx.world);
        ctx.scheduler.cancel_where(Action::is_wave_action);
        self.wave = 0;
        self.total_spawned = 0;
        self.total_killed = 0;
        self.spawning = false;
        self.all_complete = false;
        self.completion_handled = false;
        log::info!("wave director reset");
        self.begin(ctx);
    }

    /// Choose where the next enemy appears, falling back from fixed spawn
    /// points to player-relative placement to the world origin.
    fn spawn_pose(&self, ctx: &mut DirectorCtx) -> Pose {
        let player_position = self
            .player
            .and_then(|p| ctx.world.get::<&Kinematics>(p).ok().map(|k| k.position));
        let radius = self.spawn.spawn_radius;

        let mut fallback_rotation = DQuat::IDENTITY;
        let position = if self.spawn.use_spawn_points && !self.spawn.spawn_points.is_empty() {
            let point = self.spawn.spawn_points[ctx.rng.gen_range(0..self.spawn.spawn_points.len())];
            fallback_rotation = point.rotation;
            point.position + inside_unit_sphere(ctx.rng) * radius * SPAWN_POINT_JITTER_FACTOR
        } else {
            match player_position {
                Some(center) => {
                    let mut offset = on_unit_sphere(ctx.rng) * radius;
                    offset.y = ctx
                        .rng
                        .gen_range(-PLAYER_RELATIVE_SPAWN_HEIGHT..=PLAYER_RELATIVE_SPAWN_HEIGHT);
                    center + offset
                }
                None => DVec3::ZERO + inside_unit_sphere(ctx.rng) * radius,
            }
        };

        let rotation = player_position
            .and_then(|p| look_rotation(p - position, DVec3::Y))
            .unwrap_or(fallback_rotation);
        Pose::new(position, rotation)
    }

    fn report_missing_template(&self, ctx: &mut DirectorCtx) {
        log::error!("no enemy template configured, cannot spawn wave {}", self.wave + 1);
        ctx.alert(
            AlertLevel::Error,
            "No enemy template configured; wave spawning skipped".to_string(),
        );
    }
}
