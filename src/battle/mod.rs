//! Battle model - entities, units and formations plus their combat state
//!
//! Entities are the simulated objects, units aggregate their armor and
//! crits, formations are the actors that take turns, negotiate engagement
//! control and check morale.

pub mod constants;
pub mod engagement;
pub mod entity;
pub mod morale;
pub mod round_log;
pub mod units;

// Re-exports for convenient access
pub use constants::*;
pub use engagement::{
    available_controls, choose_engagement_control, is_eligible_target, select_target,
    EngagementControl, EngagementTable, EngagementWeights,
};
pub use entity::{
    CriticalSlot, Crew, Entity, EntityKind, Location, LocationRole, RemovalCondition, SystemKind,
};
pub use morale::MoraleStatus;
pub use round_log::{EngagementRecord, EngagementRole, RoundLog};
pub use units::{DamageVector, Formation, Medium, RangeBand, Unit};
