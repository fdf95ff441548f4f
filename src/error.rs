//! Error types shared across the pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// The row source could not be fetched or parsed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    #[error("loader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Error state of a single derived view. Stored inside published snapshots,
/// so it carries messages rather than source errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("track table unavailable: {0}")]
    Load(String),

    #[error("view builder failed: {0}")]
    Builder(String),

    #[error("view not computed yet")]
    NotComputed,
}

/// Configuration file could not be read or parsed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value: {0}")]
    Invalid(String),
}
