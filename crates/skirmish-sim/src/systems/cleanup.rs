//! Cleanup system: removes entities whose destruction came due this tick.

use hecs::{Entity, World};

/// Despawn every buffered entity. Entities already gone are skipped.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
