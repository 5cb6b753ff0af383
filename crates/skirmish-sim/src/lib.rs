//! Simulation engine for SKIRMISH.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! schedules deferred actions, directs enemy waves and produces
//! GameStateSnapshots for the frontend.

pub mod bus;
pub mod director;
pub mod engine;
pub mod physics;
pub mod scheduler;
pub mod systems;
pub mod world_setup;

pub use skirmish_core as core;
pub use engine::{SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
