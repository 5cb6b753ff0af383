//! Ray queries over sphere colliders, and world-backed vitality lookup.
//!
//! `ColliderSet` is a per-tick snapshot of every present collider. It stands
//! in for a physics engine: rays report the nearest sphere they enter, and a
//! ray that starts inside a sphere does not report it.

use glam::DVec3;
use hecs::{Entity, World};

use skirmish_combat::resolver::{RayHit, SpatialQuery, VitalityStore};
use skirmish_combat::vitality::Vitality;
use skirmish_core::components::{Collider, Kinematics, Presence};

#[derive(Debug, Clone, Copy)]
struct Sphere {
    entity: Entity,
    center: DVec3,
    radius: f64,
    layers: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    spheres: Vec<Sphere>,
}

impl ColliderSet {
    /// Snapshot every collider whose presence is enabled.
    pub fn from_world(world: &World) -> Self {
        let mut set = Self::default();
        let mut query = world.query::<(&Kinematics, &Collider, Option<&Presence>)>();
        for (entity, (kin, collider, presence)) in query.iter() {
            if presence.is_some_and(|p| !p.enabled) {
                continue;
            }
            set.insert(entity, kin.position, collider.radius, collider.layers);
        }
        set
    }

    pub fn insert(&mut self, entity: Entity, center: DVec3, radius: f64, layers: u32) {
        self.spheres.push(Sphere {
            entity,
            center,
            radius,
            layers,
        });
    }

    /// Drop an entity's collider for the rest of the tick.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.spheres.len();
        self.spheres.retain(|s| s.entity != entity);
        self.spheres.len() != before
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

impl SpatialQuery for ColliderSet {
    type Handle = Entity;

    fn raycast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        layers: u32,
    ) -> Option<RayHit<Entity>> {
        let mut best: Option<RayHit<Entity>> = None;
        for sphere in &self.spheres {
            if sphere.layers & layers == 0 {
                continue;
            }
            let Some(distance) = ray_sphere_entry(origin, direction, sphere.center, sphere.radius) else {
                continue;
            };
            if distance > max_distance || best.is_some_and(|b| b.distance <= distance) {
                continue;
            }
            let point = origin + direction * distance;
            best = Some(RayHit {
                point,
                normal: (point - sphere.center).normalize_or_zero(),
                distance,
                entity: sphere.entity,
            });
        }
        best
    }
}

/// Distance along a unit ray to where it enters a sphere. `None` on a miss,
/// for spheres behind the origin and for spheres containing the origin.
fn ray_sphere_entry(origin: DVec3, direction: DVec3, center: DVec3, radius: f64) -> Option<f64> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = m.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

/// Vitality components reached through the ECS world.
pub struct WorldVitality<'a>(pub &'a mut World);

impl VitalityStore<Entity> for WorldVitality<'_> {
    fn vitality_mut(&mut self, entity: Entity) -> Option<&mut Vitality> {
        self.0.query_one_mut::<&mut Vitality>(entity).ok()
    }
}
