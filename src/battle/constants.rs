//! Battle rule constants - fixed values of the resolution rules
//!
//! Tunable values (round cap, weight tables, thresholds) live in
//! `core::config::AutoResolveConfig` instead.

// Crew
pub const CREW_DEATH_THRESHOLD: u32 = 6;
pub const HEAD_LOSS_MIN_CREW_HITS: i32 = 1;
pub const HEAD_LOSS_MAX_CREW_HITS: i32 = 5;

// Mek location weights
pub const MEK_HEAD_WEIGHT: u32 = 1;
pub const MEK_LOCATION_WEIGHT: u32 = 6;

// Mek critical destruction
pub const ENGINE_HITS_TO_DESTROY: usize = 3;

// Range modifiers
pub const SHORT_RANGE_MODIFIER: i32 = -1;
pub const MEDIUM_RANGE_MODIFIER: i32 = 2;
pub const LONG_RANGE_MODIFIER: i32 = 4;

// Skill ratings accepted by the veterancy table
pub const MIN_SKILL: i32 = 0;
pub const MAX_SKILL: i32 = 7;

// Multi-targeting
pub const SECOND_TARGET_MODIFIER: i32 = 1;
pub const MAX_TARGETS_PER_ROUND: usize = 2;

// Withdrawal
pub const CRIPPLED_WITHDRAW_MODIFIER: i32 = 1;

// Attack criticals (2d6 on a unit pushed below half armor)
pub const TARGETING_CRIT_ROLL: i32 = 8;
pub const DAMAGE_CRIT_ROLL: i32 = 10;
pub const MOBILITY_CRIT_ROLL: i32 = 12;

// Initiative
pub const MAX_INITIATIVE_REROLLS: u32 = 10;
