//! Auto-resolution configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact. The config is passed into each battle context; there
//! is no global instance, so tests and batch runs can use alternate rule sets.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::engagement::EngagementTable;
use crate::core::error::{AcarError, Result};

/// Configuration for one auto-resolved battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoResolveConfig {
    // === ROUND LOOP ===
    /// Hard cap on combat rounds
    ///
    /// Two formations that can never reduce each other to rout would
    /// otherwise loop forever. When the cap is hit the Victory phase still
    /// runs; the battlefield is only controlled if a single team survives.
    pub max_rounds: u32,

    // === WITHDRAWAL ===
    /// 2d6 target a withdrawing formation must meet
    ///
    /// The tactics-based to-hit is still computed and reported, but the
    /// roll is compared against this fixed number.
    pub withdraw_target: i32,

    // === ENGAGEMENT CONTROL ===
    /// Minimum short-range damage for a formation to consider overrun
    pub min_overrun_damage: i32,

    /// Engagement-control weights per morale state
    pub engagement_weights: EngagementTable,

    // === DAMAGE ===
    /// Fraction of pre-hit armor a single attack must strip to cause a
    /// high-stress episode (and a morale check at End phase)
    pub high_stress_armor_fraction: f32,

    /// Minimum armor reduction of one hit, as a fraction of the location's
    /// original armor
    ///
    /// At 0.1 a location never takes fewer than 10% of its armor from a hit,
    /// so small clusters still wear armor down.
    pub min_armor_reduction_fraction: f32,

    /// Damage delivered per hit when an entity is damaged in bulk
    pub damage_cluster_size: i32,

    /// One-in-N chance that a hit on a location with rear armor strikes the rear
    pub rear_hit_chance: u32,

    // === VICTORY ATTRITION ===
    /// Upper bound of final attrition, as a fraction of armor plus structure
    pub attrition_cap: f32,

    /// Extra attrition per accumulated critical on the unit
    pub attrition_per_crit: f32,
}

impl Default for AutoResolveConfig {
    fn default() -> Self {
        Self {
            max_rounds: 50,
            withdraw_target: 11,
            min_overrun_damage: 2,
            engagement_weights: EngagementTable::default(),
            high_stress_armor_fraction: 0.5,
            min_armor_reduction_fraction: 0.1,
            damage_cluster_size: 5,
            rear_hit_chance: 10,
            attrition_cap: 0.95,
            attrition_per_crit: 0.05,
        }
    }
}

impl AutoResolveConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AutoResolveConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(AcarError::InvalidConfig("max_rounds must be positive".into()));
        }

        if !(2..=12).contains(&self.withdraw_target) {
            return Err(AcarError::InvalidConfig(format!(
                "withdraw_target ({}) must be a 2d6 result",
                self.withdraw_target
            )));
        }

        if !(0.0..=1.0).contains(&self.high_stress_armor_fraction) {
            return Err(AcarError::InvalidConfig(format!(
                "high_stress_armor_fraction ({}) must be within 0..=1",
                self.high_stress_armor_fraction
            )));
        }

        if !(0.0..=1.0).contains(&self.min_armor_reduction_fraction) {
            return Err(AcarError::InvalidConfig(format!(
                "min_armor_reduction_fraction ({}) must be within 0..=1",
                self.min_armor_reduction_fraction
            )));
        }

        if !(0.0..=1.0).contains(&self.attrition_cap) || self.attrition_per_crit < 0.0 {
            return Err(AcarError::InvalidConfig(
                "attrition_cap must be within 0..=1 and attrition_per_crit non-negative".into(),
            ));
        }

        if self.damage_cluster_size <= 0 || self.rear_hit_chance == 0 {
            return Err(AcarError::InvalidConfig(
                "damage_cluster_size and rear_hit_chance must be positive".into(),
            ));
        }

        self.engagement_weights
            .validate()
            .map_err(AcarError::InvalidConfig)?;

        Ok(())
    }
}
