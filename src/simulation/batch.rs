//! Monte Carlo batches: many independent battles of one scenario in parallel

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::AutoResolveConfig;
use crate::core::error::Result;
use crate::core::types::TeamId;
use crate::scenario::Scenario;
use crate::simulation::outcome::AutoResolveConcludedEvent;
use crate::simulation::runner::run_scenario;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub battles: usize,
    /// Battles each team ended in control of the field
    pub wins: BTreeMap<TeamId, usize>,
    pub uncontrolled: usize,
    pub round_capped: usize,
    pub average_rounds: f64,
}

impl BatchSummary {
    pub fn from_events(events: &[AutoResolveConcludedEvent]) -> Self {
        let mut summary = BatchSummary {
            battles: events.len(),
            ..Default::default()
        };
        let mut total_rounds = 0u64;

        for event in events {
            match event.controlling_team {
                Some(team) => *summary.wins.entry(team).or_insert(0) += 1,
                None => summary.uncontrolled += 1,
            }
            if event.hit_round_cap {
                summary.round_capped += 1;
            }
            total_rounds += u64::from(event.rounds);
        }

        if !events.is_empty() {
            summary.average_rounds = total_rounds as f64 / events.len() as f64;
        }
        summary
    }

    /// Share of battles won by a team
    pub fn win_rate(&self, team: TeamId) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.wins.get(&team).copied().unwrap_or(0) as f64 / self.battles as f64
    }
}

/// Run `count` battles seeded `base_seed, base_seed + 1, ...`.
///
/// Each battle builds its own context and dice, so results are identical to
/// running the same seeds one by one.
pub fn run_batch(
    scenario: &Scenario,
    config: &AutoResolveConfig,
    base_seed: u64,
    count: usize,
) -> Result<BatchSummary> {
    scenario.validate()?;
    config.validate()?;

    let events = (0..count as u64)
        .into_par_iter()
        .map(|i| run_scenario(scenario, config, base_seed.wrapping_add(i)))
        .collect::<Result<Vec<_>>>()?;

    let summary = BatchSummary::from_events(&events);
    info!(
        battles = summary.battles,
        uncontrolled = summary.uncontrolled,
        average_rounds = summary.average_rounds,
        "Batch complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_counts_every_battle() {
        let summary = run_batch(&Scenario::demo(), &AutoResolveConfig::default(), 100, 8).unwrap();

        assert_eq!(summary.battles, 8);
        let decided: usize = summary.wins.values().sum();
        assert_eq!(decided + summary.uncontrolled, 8);
        assert!(summary.average_rounds >= 1.0);
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let config = AutoResolveConfig::default();
        let scenario = Scenario::demo();

        let parallel = run_batch(&scenario, &config, 7, 4).unwrap();
        let sequential: Vec<_> = (0..4)
            .map(|i| run_scenario(&scenario, &config, 7 + i).unwrap())
            .collect();

        assert_eq!(parallel, BatchSummary::from_events(&sequential));
    }

    #[test]
    fn test_empty_batch() {
        let summary = run_batch(&Scenario::demo(), &AutoResolveConfig::default(), 0, 0).unwrap();
        assert_eq!(summary, BatchSummary::default());
        assert_eq!(summary.win_rate(TeamId(1)), 0.0);
    }
}
