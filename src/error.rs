use std::path::PathBuf;

use crate::game::MoveError;

/// Errors that can occur while loading or saving a persisted Q-table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read table from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write table to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse table from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("hyperparameter out of range: {0}")]
    InvalidHyperparameter(String),

    #[error("duplicate table entry for {key}")]
    DuplicateEntry { key: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while running episodes or training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("invalid move at position {position}: {kind}")]
    InvalidMove { position: usize, kind: MoveError },

    #[error("no valid actions on a board that is not full")]
    NoValidActions,

    #[error("wildcard count {requested} exceeds board capacity {capacity}")]
    WildcardOverflow { requested: usize, capacity: usize },

    #[error("episode players must be X then O")]
    PlayerSymbols,

    #[error("episode already finished")]
    Finished,

    #[error("table error: {0}")]
    Table(#[from] TableError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
