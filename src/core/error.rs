use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcarError {
    #[error("Formation not found: {0:?}")]
    FormationNotFound(crate::core::types::FormationId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Unrecognized skill level: {0}")]
    UnknownSkill(i32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AcarError>;
