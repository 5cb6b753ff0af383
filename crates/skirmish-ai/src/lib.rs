//! AI director for SKIRMISH.
//!
//! Implements the per-agent combat state machine, the behavior executed in
//! each state, and the steering primitive shared by every behavior.
//! No ECS dependency; operates on plain data.

pub mod behavior;
pub mod fsm;
pub mod sampling;
pub mod steering;

pub use skirmish_core as core;
