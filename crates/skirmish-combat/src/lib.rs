//! Combat rules for SKIRMISH.
//!
//! Health and shield resolution, hitscan shot resolution against an abstract
//! spatial query, and the magazine-fed player gun. No ECS dependency;
//! operates on plain data.

pub mod resolver;
pub mod vitality;
pub mod weapon;

pub use skirmish_core as core;
