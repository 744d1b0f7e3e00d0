//! Crew hits and ejection

use tracing::debug;

use crate::battle::constants::CREW_DEATH_THRESHOLD;
use crate::battle::entity::{Entity, RemovalCondition};

/// What a batch of crew hits did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrewOutcome {
    /// Hits absorbed, crew still fighting
    Wounded,
    /// Crew killed; the entity goes down with it
    Killed,
    /// Lethal hit turned into a successful ejection
    Ejected,
    /// Lethal hit held one short of death
    Capped,
    /// No active crew to hit
    Unaffected,
}

/// Attempt to eject the crew. Success destroys the hull but keeps the crew.
pub fn try_eject(entity: &mut Entity) -> bool {
    if !entity.supports_ejection || !entity.crew.is_active() {
        return false;
    }
    entity.crew.ejected = true;
    entity.destroy(RemovalCondition::Ejected);
    debug!("{} crew ejected", entity.name);
    true
}

/// Apply crew hits.
///
/// When the entity must survive, a lethal batch becomes an ejection attempt;
/// if ejection is unavailable the crew is left one hit short of death.
pub fn apply_crew_hits(entity: &mut Entity, hits: u32, must_survive: bool) -> CrewOutcome {
    if hits == 0 {
        return CrewOutcome::Wounded;
    }
    if !entity.crew.is_active() {
        return CrewOutcome::Unaffected;
    }

    let total = entity.crew.hits + hits;
    if total < CREW_DEATH_THRESHOLD {
        entity.crew.hits = total;
        return CrewOutcome::Wounded;
    }

    if must_survive {
        if try_eject(entity) {
            return CrewOutcome::Ejected;
        }
        entity.crew.hits = CREW_DEATH_THRESHOLD - 1;
        return CrewOutcome::Capped;
    }

    entity.crew.hits = CREW_DEATH_THRESHOLD;
    entity.crew.dead = true;
    entity.destroy(RemovalCondition::Salvageable);
    debug!("{} crew killed", entity.name);
    CrewOutcome::Killed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_accumulate_below_threshold() {
        let mut tank = Entity::tank("Vedette", 10, 5);
        assert_eq!(apply_crew_hits(&mut tank, 2, false), CrewOutcome::Wounded);
        assert_eq!(apply_crew_hits(&mut tank, 3, false), CrewOutcome::Wounded);
        assert_eq!(tank.crew.hits, 5);
        assert!(tank.is_active());
    }

    #[test]
    fn test_lethal_hits_kill_crew() {
        let mut tank = Entity::tank("Vedette", 10, 5);
        assert_eq!(apply_crew_hits(&mut tank, 6, false), CrewOutcome::Killed);
        assert!(tank.crew.dead);
        assert!(tank.destroyed);
        assert_eq!(tank.removal_condition(), Some(RemovalCondition::Salvageable));
    }

    #[test]
    fn test_must_survive_ejects_when_supported() {
        let mut mek = Entity::mek("Wolverine", 20, 10);
        assert_eq!(apply_crew_hits(&mut mek, 6, true), CrewOutcome::Ejected);
        assert!(mek.destroyed);
        assert!(!mek.crew.dead);
        assert_eq!(mek.removal_condition(), Some(RemovalCondition::Ejected));
    }

    #[test]
    fn test_must_survive_caps_without_ejection() {
        let mut tank = Entity::tank("Vedette", 10, 5);
        assert_eq!(apply_crew_hits(&mut tank, 9, true), CrewOutcome::Capped);
        assert_eq!(tank.crew.hits, CREW_DEATH_THRESHOLD - 1);
        assert!(tank.is_active());
    }

    #[test]
    fn test_already_ejected_cannot_eject_again() {
        let mut mek = Entity::mek("Wolverine", 20, 10);
        assert!(try_eject(&mut mek));
        assert!(!try_eject(&mut mek));
        assert_eq!(apply_crew_hits(&mut mek, 6, true), CrewOutcome::Unaffected);
    }
}
