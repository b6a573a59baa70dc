// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdexecError {
    /// The request was malformed (e.g. empty command). Raised before any
    /// process is launched.
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The process could not be spawned for a reason other than the
    /// executable being missing or not executable.
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Helper error: {0}")]
    Helper(String),

    /// Only produced when the caller sets `reject = true`.
    #[error("command exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdexecError>;
