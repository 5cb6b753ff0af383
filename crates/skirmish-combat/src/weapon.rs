//! Magazine-fed hitscan gun with round-robin barrels.
//!
//! The gun only tracks ammunition, cooldown and reload state. Completing a
//! reload is a deferred action owned by the caller: when the trigger reports
//! [`TriggerOutcome::ReloadStarted`] (or [`Weapon::begin_reload`] returns
//! true) the caller schedules [`Weapon::finish_reload`] after
//! [`Weapon::reload_secs`].

use skirmish_core::config::WeaponConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A round left from the given barrel.
    Fired { barrel: usize },
    CoolingDown,
    Reloading,
    /// Magazine was empty; a reload has begun.
    ReloadStarted,
}

#[derive(Debug, Clone)]
pub struct Weapon {
    config: WeaponConfig,
    ammo: u32,
    reloading: bool,
    next_fire_secs: f64,
    next_barrel: usize,
}

impl Weapon {
    pub fn new(config: WeaponConfig) -> Self {
        Self {
            ammo: config.magazine_size,
            config,
            reloading: false,
            next_fire_secs: 0.0,
            next_barrel: 0,
        }
    }

    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn magazine_size(&self) -> u32 {
        self.config.magazine_size
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn reload_secs(&self) -> f64 {
        self.config.reload_secs
    }

    /// Try to fire one round at `now` from a gun with `barrels` fire points.
    pub fn pull_trigger(&mut self, now: f64, barrels: usize) -> TriggerOutcome {
        if self.reloading {
            return TriggerOutcome::Reloading;
        }
        if now < self.next_fire_secs {
            return TriggerOutcome::CoolingDown;
        }
        if self.ammo == 0 {
            self.reloading = true;
            return TriggerOutcome::ReloadStarted;
        }

        let barrels = barrels.max(1);
        let barrel = self.next_barrel % barrels;
        self.next_barrel = (barrel + 1) % barrels;
        self.next_fire_secs = now + self.config.fire_interval_secs;
        self.ammo -= 1;
        TriggerOutcome::Fired { barrel }
    }

    /// Start a manual reload. No-op while reloading or with a full magazine.
    pub fn begin_reload(&mut self) -> bool {
        if self.reloading || self.ammo >= self.config.magazine_size {
            return false;
        }
        self.reloading = true;
        true
    }

    pub fn finish_reload(&mut self) {
        self.ammo = self.config.magazine_size;
        self.reloading = false;
    }

    pub fn add_ammo(&mut self, amount: u32) {
        self.ammo = self.ammo.saturating_add(amount).min(self.config.magazine_size);
    }
}
