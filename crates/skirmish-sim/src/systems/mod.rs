//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components, the scheduler and
//! the wave director.

pub mod agent_ai;
pub mod cleanup;
pub mod combat;
pub mod movement;
pub mod player;
pub mod snapshot;
pub mod vitality;
