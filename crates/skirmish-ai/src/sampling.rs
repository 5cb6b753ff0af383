//! Uniform random points in and on the unit sphere.

use glam::DVec3;
use rand::Rng;

/// Uniform point inside the unit ball (rejection sampled from the cube).
pub fn inside_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform unit direction.
pub fn on_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    loop {
        let p = inside_unit_sphere(rng);
        // Near-zero samples normalize badly.
        if p.length_squared() > 1e-6 {
            return p.normalize();
        }
    }
}
