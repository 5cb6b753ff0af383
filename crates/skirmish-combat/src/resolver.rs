//! Hitscan shot resolution.
//!
//! A shot is one ray: origin, direction, range, damage and the firer's team.
//! The physics world is consumed through [`SpatialQuery`]; the vitality of
//! whatever the ray hits is reached through [`VitalityStore`]. Hits on the
//! firer's own team are reported but never damaged.

use std::collections::HashMap;
use std::hash::Hash;

use glam::DVec3;

use skirmish_core::enums::Team;

use crate::vitality::{DamageOutcome, Hit, Vitality, VitalityEvent};

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<H> {
    pub point: DVec3,
    pub normal: DVec3,
    pub distance: f64,
    pub entity: H,
}

/// Ray queries against the physics world.
pub trait SpatialQuery {
    type Handle: Copy;

    /// Nearest hit along `direction` (unit length) within `max_distance`,
    /// considering only colliders on `layers`.
    fn raycast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        layers: u32,
    ) -> Option<RayHit<Self::Handle>>;
}

/// Mutable access to the vitality of whatever a ray hit.
pub trait VitalityStore<H> {
    fn vitality_mut(&mut self, entity: H) -> Option<&mut Vitality>;
}

impl<H: Hash + Eq> VitalityStore<H> for HashMap<H, Vitality> {
    fn vitality_mut(&mut self, entity: H) -> Option<&mut Vitality> {
        self.get_mut(&entity)
    }
}

/// One ray to resolve.
#[derive(Debug, Clone, Copy)]
pub struct Shot {
    pub origin: DVec3,
    pub direction: DVec3,
    pub range: f64,
    pub damage: f64,
    pub team: Team,
    pub layers: u32,
}

/// What a shot did, for tracers and muzzle effects.
#[derive(Debug, Clone, Copy)]
pub struct ShotReport<H> {
    pub hit: Option<RayHit<H>>,
    /// Hit point, or the end of the ray on a miss.
    pub end: DVec3,
    pub outcome: DamageOutcome,
}

impl<H> ShotReport<H> {
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }
}

/// Fire `shot`, damaging the first thing it hits unless it is on the firer's team.
///
/// Vitality notifications are appended to `events` tagged with the handle of
/// the entity they belong to.
pub fn resolve_shot<Q, S>(
    query: &Q,
    store: &mut S,
    shot: &Shot,
    now: f64,
    events: &mut Vec<(Q::Handle, VitalityEvent)>,
) -> ShotReport<Q::Handle>
where
    Q: SpatialQuery,
    S: VitalityStore<Q::Handle>,
{
    let Some(direction) = shot.direction.try_normalize() else {
        return ShotReport {
            hit: None,
            end: shot.origin,
            outcome: DamageOutcome::Ignored,
        };
    };

    let Some(hit) = query.raycast(shot.origin, direction, shot.range, shot.layers) else {
        return ShotReport {
            hit: None,
            end: shot.origin + direction * shot.range,
            outcome: DamageOutcome::Ignored,
        };
    };

    let mut outcome = DamageOutcome::Ignored;
    if let Some(target) = store.vitality_mut(hit.entity) {
        if target.team() != shot.team {
            let mut changes = Vec::new();
            outcome = target.take_damage(
                Hit {
                    amount: shot.damage,
                    point: hit.point,
                    direction,
                },
                now,
                &mut changes,
            );
            events.extend(changes.into_iter().map(|e| (hit.entity, e)));
        } else {
            log::trace!("shot from {:?} ignored: same team", shot.team);
        }
    }

    ShotReport {
        hit: Some(hit),
        end: hit.point,
        outcome,
    }
}
