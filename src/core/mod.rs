pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::AutoResolveConfig;
pub use dice::{Dice, FixedDice, RngDice};
pub use error::{AcarError, Result};
