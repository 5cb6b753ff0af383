//! Health and shield model shared by the player and every agent.
//!
//! Shield soaks damage before health. Death is edge-triggered: the first call
//! that takes health to zero publishes `Died`, and every later damage, heal or
//! kill call is silently ignored until the entity respawns.

use glam::DVec3;

use skirmish_core::config::{DeathPolicy, VitalityConfig};
use skirmish_core::enums::Team;
use skirmish_core::types::Pose;

/// Notification produced by a vitality change, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VitalityEvent {
    /// New health fraction.
    HealthChanged(f64),
    /// New shield fraction.
    ShieldChanged(f64),
    Damaged {
        amount: f64,
        hit_point: DVec3,
        hit_direction: DVec3,
    },
    Died,
    Respawned,
}

/// One incoming hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub amount: f64,
    pub point: DVec3,
    /// Direction the damage travelled in.
    pub direction: DVec3,
}

/// What a `take_damage` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead target or non-positive amount; nothing changed.
    Ignored,
    /// Damage applied, target still alive.
    Damaged,
    /// This hit killed the target.
    Killed,
}

#[derive(Debug, Clone)]
pub struct Vitality {
    max_health: f64,
    health: f64,
    has_shield: bool,
    max_shield: f64,
    shield: f64,
    shield_regen_rate: f64,
    shield_regen_delay_secs: f64,
    last_damage_secs: Option<f64>,
    dead: bool,
    team: Team,
    death: DeathPolicy,
    spawn_pose: Pose,
}

impl Vitality {
    /// Full health and shield, remembering `spawn_pose` for respawns.
    pub fn new(config: &VitalityConfig, team: Team, spawn_pose: Pose) -> Self {
        let max_shield = if config.has_shield { config.max_shield } else { 0.0 };
        Self {
            max_health: config.max_health,
            health: config.max_health,
            has_shield: config.has_shield,
            max_shield,
            shield: max_shield,
            shield_regen_rate: config.shield_regen_rate,
            shield_regen_delay_secs: config.shield_regen_delay_secs,
            last_damage_secs: None,
            dead: false,
            team,
            death: config.death,
            spawn_pose,
        }
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn shield(&self) -> f64 {
        self.shield
    }

    pub fn max_shield(&self) -> f64 {
        self.max_shield
    }

    pub fn has_shield(&self) -> bool {
        self.has_shield
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn death_policy(&self) -> DeathPolicy {
        self.death
    }

    pub fn spawn_pose(&self) -> Pose {
        self.spawn_pose
    }

    pub fn last_damage_secs(&self) -> Option<f64> {
        self.last_damage_secs
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn shield_fraction(&self) -> f64 {
        if self.has_shield && self.max_shield > 0.0 {
            self.shield / self.max_shield
        } else {
            0.0
        }
    }

    pub fn set_spawn_pose(&mut self, pose: Pose) {
        self.spawn_pose = pose;
    }

    /// Apply one hit: shield first, remainder to health, clamped at zero.
    pub fn take_damage(&mut self, hit: Hit, now: f64, events: &mut Vec<VitalityEvent>) -> DamageOutcome {
        if self.dead || hit.amount <= 0.0 || hit.amount.is_nan() {
            return DamageOutcome::Ignored;
        }

        self.last_damage_secs = Some(now);
        let mut remaining = hit.amount;

        if self.has_shield && self.shield > 0.0 {
            let absorbed = self.shield.min(remaining);
            self.shield -= absorbed;
            remaining -= absorbed;
            events.push(VitalityEvent::ShieldChanged(self.shield_fraction()));
        }

        if remaining > 0.0 {
            self.health = (self.health - remaining).max(0.0);
            events.push(VitalityEvent::HealthChanged(self.health_fraction()));
        }

        events.push(VitalityEvent::Damaged {
            amount: hit.amount,
            hit_point: hit.point,
            hit_direction: hit.direction,
        });

        if self.health <= 0.0 {
            self.die(events);
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged
        }
    }

    pub fn heal(&mut self, amount: f64, events: &mut Vec<VitalityEvent>) {
        if self.dead || amount <= 0.0 || amount.is_nan() {
            return;
        }
        self.health = (self.health + amount).min(self.max_health);
        events.push(VitalityEvent::HealthChanged(self.health_fraction()));
    }

    pub fn regenerate_shield(&mut self, amount: f64, events: &mut Vec<VitalityEvent>) {
        if !self.has_shield || self.dead || amount <= 0.0 || amount.is_nan() {
            return;
        }
        self.shield = (self.shield + amount).min(self.max_shield);
        events.push(VitalityEvent::ShieldChanged(self.shield_fraction()));
    }

    pub fn full_restore(&mut self, events: &mut Vec<VitalityEvent>) {
        self.health = self.max_health;
        self.shield = self.max_shield;
        events.push(VitalityEvent::HealthChanged(self.health_fraction()));
        events.push(VitalityEvent::ShieldChanged(self.shield_fraction()));
    }

    /// Zero health and shield and die. Returns false if already dead.
    pub fn instant_kill(&mut self, events: &mut Vec<VitalityEvent>) -> bool {
        if self.dead {
            return false;
        }
        self.health = 0.0;
        self.shield = 0.0;
        self.die(events);
        true
    }

    /// Passive shield regeneration for one tick of `dt` seconds.
    pub fn tick_regen(&mut self, now: f64, dt: f64, events: &mut Vec<VitalityEvent>) {
        if self.dead || !self.has_shield || self.shield >= self.max_shield {
            return;
        }
        let rested = match self.last_damage_secs {
            Some(at) => now - at >= self.shield_regen_delay_secs,
            None => true,
        };
        if rested {
            self.regenerate_shield(self.shield_regen_rate * dt, events);
        }
    }

    /// Bring a dead entity back with full vitality. Returns the pose it should
    /// reappear at, or `None` if it was not dead.
    pub fn respawn(&mut self, events: &mut Vec<VitalityEvent>) -> Option<Pose> {
        if !self.dead {
            return None;
        }
        self.dead = false;
        self.last_damage_secs = None;
        self.full_restore(events);
        events.push(VitalityEvent::Respawned);
        Some(self.spawn_pose)
    }

    fn die(&mut self, events: &mut Vec<VitalityEvent>) {
        self.dead = true;
        events.push(VitalityEvent::Died);
    }
}
