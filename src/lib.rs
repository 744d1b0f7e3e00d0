//! ACAR - Abstract Combat Auto-Resolution
//!
//! Resolves a battle between formations of combat units without a map:
//! phases drive target selection, engagement control, attacks, morale and
//! withdrawal until one team holds the field.

pub mod actions;
pub mod battle;
pub mod combat;
pub mod core;
pub mod scenario;
pub mod simulation;
