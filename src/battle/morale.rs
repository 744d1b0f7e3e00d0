//! Morale status of a formation
//!
//! Morale only ever worsens through failed morale checks, one step at a time.
//! The recovering-nerve check is the single way back toward Normal.

use serde::{Deserialize, Serialize};

/// Ordered morale scale, best first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum MoraleStatus {
    #[default]
    Normal,
    Unsteady,
    Shaken,
    Broken,
    Routed,
}

impl MoraleStatus {
    pub const ALL: [MoraleStatus; 5] = [
        MoraleStatus::Normal,
        MoraleStatus::Unsteady,
        MoraleStatus::Shaken,
        MoraleStatus::Broken,
        MoraleStatus::Routed,
    ];

    /// One step toward Routed (Routed stays Routed)
    pub fn worsened(self) -> Self {
        match self {
            MoraleStatus::Normal => MoraleStatus::Unsteady,
            MoraleStatus::Unsteady => MoraleStatus::Shaken,
            MoraleStatus::Shaken => MoraleStatus::Broken,
            MoraleStatus::Broken | MoraleStatus::Routed => MoraleStatus::Routed,
        }
    }

    /// One step toward Normal (Normal stays Normal)
    pub fn improved(self) -> Self {
        match self {
            MoraleStatus::Normal | MoraleStatus::Unsteady => MoraleStatus::Normal,
            MoraleStatus::Shaken => MoraleStatus::Unsteady,
            MoraleStatus::Broken => MoraleStatus::Shaken,
            MoraleStatus::Routed => MoraleStatus::Broken,
        }
    }

    pub fn is_shaken_or_worse(self) -> bool {
        self >= MoraleStatus::Shaken
    }

    pub fn is_routed(self) -> bool {
        self == MoraleStatus::Routed
    }

    /// Penalty this morale state puts on the formation's own checks
    pub fn own_check_modifier(self) -> i32 {
        match self {
            MoraleStatus::Normal => 0,
            MoraleStatus::Unsteady => 1,
            MoraleStatus::Shaken => 2,
            MoraleStatus::Broken => 3,
            MoraleStatus::Routed => 4,
        }
    }

    /// Bonus an attacker gets against a formation in this state
    pub fn as_target_modifier(self) -> i32 {
        match self {
            MoraleStatus::Normal => 0,
            MoraleStatus::Shaken => 1,
            MoraleStatus::Unsteady => 2,
            MoraleStatus::Broken => 3,
            MoraleStatus::Routed => 4,
        }
    }
}

impl std::fmt::Display for MoraleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoraleStatus::Normal => "normal",
            MoraleStatus::Unsteady => "unsteady",
            MoraleStatus::Shaken => "shaken",
            MoraleStatus::Broken => "broken",
            MoraleStatus::Routed => "routed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worsened_moves_one_step() {
        assert_eq!(MoraleStatus::Normal.worsened(), MoraleStatus::Unsteady);
        assert_eq!(MoraleStatus::Unsteady.worsened(), MoraleStatus::Shaken);
        assert_eq!(MoraleStatus::Shaken.worsened(), MoraleStatus::Broken);
        assert_eq!(MoraleStatus::Broken.worsened(), MoraleStatus::Routed);
    }

    #[test]
    fn test_routed_is_absorbing() {
        assert_eq!(MoraleStatus::Routed.worsened(), MoraleStatus::Routed);
    }

    #[test]
    fn test_improved_moves_toward_normal() {
        assert_eq!(MoraleStatus::Routed.improved(), MoraleStatus::Broken);
        assert_eq!(MoraleStatus::Shaken.improved(), MoraleStatus::Unsteady);
        assert_eq!(MoraleStatus::Normal.improved(), MoraleStatus::Normal);
    }

    #[test]
    fn test_ordering() {
        assert!(MoraleStatus::Normal < MoraleStatus::Routed);
        assert!(MoraleStatus::Shaken.is_shaken_or_worse());
        assert!(!MoraleStatus::Unsteady.is_shaken_or_worse());
    }

    #[test]
    fn test_target_modifiers() {
        assert_eq!(MoraleStatus::Shaken.as_target_modifier(), 1);
        assert_eq!(MoraleStatus::Unsteady.as_target_modifier(), 2);
        assert_eq!(MoraleStatus::Broken.as_target_modifier(), 3);
        assert_eq!(MoraleStatus::Routed.as_target_modifier(), 4);
    }
}
