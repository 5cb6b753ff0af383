//! Tunable configuration for every combat participant.
//!
//! All values are static for the lifetime of a simulation. Defaults match the
//! tuned prototype; every struct is `#[serde(default)]` so a partial JSON
//! document only needs to name the fields it overrides.

use std::f64::consts::FRAC_PI_2;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{look_rotation, Pose};

/// Errors raised when validating configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite non-negative number, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be between 0.0 and 1.0, got {value}")]
    NotAProbability { field: &'static str, value: f64 },
    #[error("max_enemies_per_wave must be at least 1")]
    ZeroWaveCap,
    #[error("magazine_size must be at least 1")]
    EmptyMagazine,
    #[error("invalid configuration json: {0}")]
    Json(String),
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotAProbability { field, value })
    }
}

/// What happens after an entity dies. Fixed when the entity is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy")]
pub enum DeathPolicy {
    /// Remove the entity after `delay_secs`.
    Destroy { delay_secs: f64 },
    /// Restore the entity at its spawn pose after `delay_secs`.
    Respawn { delay_secs: f64 },
}

impl DeathPolicy {
    pub fn delay_secs(&self) -> f64 {
        match *self {
            DeathPolicy::Destroy { delay_secs } | DeathPolicy::Respawn { delay_secs } => delay_secs,
        }
    }
}

impl Default for DeathPolicy {
    fn default() -> Self {
        DeathPolicy::Destroy { delay_secs: 0.5 }
    }
}

/// Health and shield tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalityConfig {
    pub max_health: f64,
    pub has_shield: bool,
    pub max_shield: f64,
    /// Shield points restored per second once regeneration is allowed.
    pub shield_regen_rate: f64,
    /// Seconds without damage before the shield starts regenerating.
    pub shield_regen_delay_secs: f64,
    pub death: DeathPolicy,
}

impl Default for VitalityConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            has_shield: true,
            max_shield: 200.0,
            shield_regen_rate: 20.0,
            shield_regen_delay_secs: 5.0,
            death: DeathPolicy::default(),
        }
    }
}

impl VitalityConfig {
    /// Player ship: shielded, respawns after three seconds.
    pub fn player() -> Self {
        Self {
            death: DeathPolicy::Respawn { delay_secs: 3.0 },
            ..Self::default()
        }
    }

    /// Enemy fighter: light hull, no shield, removed shortly after death.
    pub fn fighter() -> Self {
        Self {
            max_health: 50.0,
            has_shield: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_health", self.max_health)?;
        if self.has_shield {
            positive("max_shield", self.max_shield)?;
        }
        non_negative("shield_regen_rate", self.shield_regen_rate)?;
        non_negative("shield_regen_delay_secs", self.shield_regen_delay_secs)?;
        non_negative("death.delay_secs", self.death.delay_secs())
    }
}

/// AI agent tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Beyond this distance the target is ignored.
    pub detection_range: f64,
    /// Bind to the player automatically when the agent has no valid target.
    pub auto_acquire_player: bool,

    pub move_speed: f64,
    /// Forward thrust (m/s²).
    pub acceleration: f64,
    /// Steering turn rate (degrees/second).
    pub turn_speed_deg: f64,
    pub linear_damping: f64,

    pub attack_range: f64,
    /// Distance the agent tries to hold while attacking.
    pub optimal_attack_range: f64,
    /// Seconds between shots.
    pub fire_interval_secs: f64,
    pub weapon_damage: f64,
    pub weapon_range: f64,
    /// Fire only when the target is within this cone (degrees).
    pub aim_tolerance_deg: f64,

    /// Evasion is considered only when the target is closer than this.
    pub evasion_distance: f64,
    /// Per-tick probability of evading while inside `evasion_distance`.
    pub evasion_chance: f64,
    /// Patrol points are drawn within this radius of home.
    pub patrol_radius: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_range: 500.0,
            auto_acquire_player: true,
            move_speed: 40.0,
            acceleration: 20.0,
            turn_speed_deg: 80.0,
            linear_damping: 0.5,
            attack_range: 300.0,
            optimal_attack_range: 200.0,
            fire_interval_secs: 0.3,
            weapon_damage: 8.0,
            weapon_range: 400.0,
            aim_tolerance_deg: 10.0,
            evasion_distance: 50.0,
            evasion_chance: 0.3,
            patrol_radius: 100.0,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("detection_range", self.detection_range)?;
        positive("move_speed", self.move_speed)?;
        non_negative("acceleration", self.acceleration)?;
        non_negative("turn_speed_deg", self.turn_speed_deg)?;
        non_negative("linear_damping", self.linear_damping)?;
        non_negative("attack_range", self.attack_range)?;
        non_negative("optimal_attack_range", self.optimal_attack_range)?;
        non_negative("fire_interval_secs", self.fire_interval_secs)?;
        non_negative("weapon_damage", self.weapon_damage)?;
        non_negative("weapon_range", self.weapon_range)?;
        non_negative("aim_tolerance_deg", self.aim_tolerance_deg)?;
        non_negative("evasion_distance", self.evasion_distance)?;
        probability("evasion_chance", self.evasion_chance)?;
        non_negative("patrol_radius", self.patrol_radius)
    }
}

/// Magazine-fed hitscan gun.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub damage: f64,
    /// Seconds between shots.
    pub fire_interval_secs: f64,
    pub range: f64,
    pub magazine_size: u32,
    pub reload_secs: f64,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            fire_interval_secs: 0.1,
            range: 500.0,
            magazine_size: 100,
            reload_secs: 2.0,
        }
    }
}

impl WeaponConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("weapon.damage", self.damage)?;
        non_negative("weapon.fire_interval_secs", self.fire_interval_secs)?;
        non_negative("weapon.range", self.range)?;
        non_negative("weapon.reload_secs", self.reload_secs)?;
        if self.magazine_size == 0 {
            return Err(ConfigError::EmptyMagazine);
        }
        Ok(())
    }
}

/// Player ship flight model, hull and gun.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerShipConfig {
    pub forward_acceleration: f64,
    pub strafe_acceleration: f64,
    pub vertical_acceleration: f64,
    pub boost_multiplier: f64,
    pub max_speed: f64,
    pub drag: f64,

    /// Rotation rates (degrees/second) at full stick.
    pub yaw_speed_deg: f64,
    pub pitch_speed_deg: f64,
    pub roll_speed_deg: f64,

    pub align_to_velocity: bool,
    pub align_lerp: f64,

    pub collider_radius: f64,
    pub hardpoints: Vec<DVec3>,
    pub vitality: VitalityConfig,
    pub weapon: WeaponConfig,
}

impl Default for PlayerShipConfig {
    fn default() -> Self {
        Self {
            forward_acceleration: 30.0,
            strafe_acceleration: 20.0,
            vertical_acceleration: 20.0,
            boost_multiplier: 2.5,
            max_speed: 60.0,
            drag: 0.2,
            yaw_speed_deg: 90.0,
            pitch_speed_deg: 90.0,
            roll_speed_deg: 110.0,
            align_to_velocity: true,
            align_lerp: 6.0,
            collider_radius: 1.5,
            hardpoints: vec![DVec3::new(-0.8, 0.0, 1.2), DVec3::new(0.8, 0.0, 1.2)],
            vitality: VitalityConfig::player(),
            weapon: WeaponConfig::default(),
        }
    }
}

impl PlayerShipConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("forward_acceleration", self.forward_acceleration)?;
        non_negative("strafe_acceleration", self.strafe_acceleration)?;
        non_negative("vertical_acceleration", self.vertical_acceleration)?;
        non_negative("boost_multiplier", self.boost_multiplier)?;
        positive("max_speed", self.max_speed)?;
        non_negative("drag", self.drag)?;
        non_negative("align_lerp", self.align_lerp)?;
        positive("collider_radius", self.collider_radius)?;
        self.vitality.validate()?;
        self.weapon.validate()
    }
}

/// Everything needed to instantiate one enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTemplate {
    pub vitality: VitalityConfig,
    pub agent: AgentConfig,
    pub collider_radius: f64,
    pub hardpoints: Vec<DVec3>,
}

impl Default for AgentTemplate {
    fn default() -> Self {
        Self {
            vitality: VitalityConfig::fighter(),
            agent: AgentConfig::default(),
            collider_radius: 1.5,
            hardpoints: vec![DVec3::new(0.0, 0.0, 1.2)],
        }
    }
}

impl AgentTemplate {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("collider_radius", self.collider_radius)?;
        self.vitality.validate()?;
        self.agent.validate()
    }
}

/// Wave progression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Start the first wave automatically and chain waves after each clear.
    pub auto_start: bool,
    pub time_between_waves_secs: f64,
    pub first_wave_delay_secs: f64,
    /// Number of waves before the cycle completes. 0 = unlimited.
    pub max_waves: u32,

    pub initial_enemy_count: u32,
    pub enemies_per_wave_increase: u32,
    pub max_enemies_per_wave: u32,
    /// When false every wave spawns `initial_enemy_count`.
    pub increase_with_waves: bool,

    /// Seconds between spawns inside one wave.
    pub spawn_interval_secs: f64,
    pub spawn_all_at_once: bool,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            time_between_waves_secs: 10.0,
            first_wave_delay_secs: 3.0,
            max_waves: 10,
            initial_enemy_count: 5,
            enemies_per_wave_increase: 2,
            max_enemies_per_wave: 20,
            increase_with_waves: true,
            spawn_interval_secs: 2.0,
            spawn_all_at_once: false,
        }
    }
}

impl WaveConfig {
    /// Number of enemies in the given (1-based) wave.
    pub fn enemy_count(&self, wave: u32) -> u32 {
        if !self.increase_with_waves {
            return self.initial_enemy_count;
        }
        let grown = self
            .initial_enemy_count
            .saturating_add(wave.saturating_sub(1).saturating_mul(self.enemies_per_wave_increase));
        grown.min(self.max_enemies_per_wave)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("time_between_waves_secs", self.time_between_waves_secs)?;
        non_negative("first_wave_delay_secs", self.first_wave_delay_secs)?;
        non_negative("spawn_interval_secs", self.spawn_interval_secs)?;
        if self.max_enemies_per_wave == 0 {
            return Err(ConfigError::ZeroWaveCap);
        }
        Ok(())
    }
}

/// Where enemies appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub spawn_points: Vec<Pose>,
    pub spawn_radius: f64,
    /// Prefer the fixed spawn points over player-relative placement.
    pub use_spawn_points: bool,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        // Four points on a 200 m ring in the horizontal plane, facing the origin.
        let spawn_points = (0..4)
            .map(|i| {
                let angle = i as f64 * FRAC_PI_2;
                let position = DVec3::new(angle.cos(), 0.0, angle.sin()) * 200.0;
                let rotation = look_rotation(-position, DVec3::Y).unwrap_or(DQuat::IDENTITY);
                Pose::new(position, rotation)
            })
            .collect();
        Self {
            spawn_points,
            spawn_radius: 50.0,
            use_spawn_points: true,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("spawn_radius", self.spawn_radius)
    }
}

/// Complete tuning for one simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub player: PlayerShipConfig,
    /// Agent instantiated by the wave director. `None` is a configuration
    /// error reported at spawn time.
    pub enemy_template: Option<AgentTemplate>,
    pub waves: WaveConfig,
    pub spawn: SpawnConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player: PlayerShipConfig::default(),
            enemy_template: Some(AgentTemplate::default()),
            waves: WaveConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

impl CombatConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate()?;
        if let Some(template) = &self.enemy_template {
            template.validate()?;
        }
        self.waves.validate()?;
        self.spawn.validate()
    }
}
