//! Battle simulation: the context, the phase state machine and its runner

pub mod batch;
pub mod context;
pub mod outcome;
pub mod phase;
pub mod phases;
pub mod report;
pub mod runner;

pub use batch::{run_batch, BatchSummary};
pub use context::{BattleContext, Player};
pub use outcome::{AutoResolveConcludedEvent, EntityOutcome};
pub use phase::Phase;
pub use phases::{round_handlers, PhaseHandler};
pub use report::{BattleLog, ReportKind, ReportLine};
pub use runner::{run_battle, run_scenario};
