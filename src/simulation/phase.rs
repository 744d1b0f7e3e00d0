use serde::{Deserialize, Serialize};

/// Phases of the auto-resolution state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Deployment,
    Initiative,
    /// Movement includes engagement control and attack resolution
    Movement,
    End,
    Victory,
}

impl Phase {
    /// Phases repeated every round, in order
    pub const ROUND: [Phase; 4] = [
        Phase::Deployment,
        Phase::Initiative,
        Phase::Movement,
        Phase::End,
    ];
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Deployment => write!(f, "deployment"),
            Phase::Initiative => write!(f, "initiative"),
            Phase::Movement => write!(f, "movement"),
            Phase::End => write!(f, "end"),
            Phase::Victory => write!(f, "victory"),
        }
    }
}
