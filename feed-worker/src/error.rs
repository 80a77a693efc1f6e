//! Error types shared across the worker.
//!
//! Every failure is contained within a single poll cycle; the scheduler logs
//! a [`CycleError`] and keeps ticking.

use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} is not a valid http(s) url: {value}")]
    InvalidUrl { name: &'static str, value: String },
}

/// The feed could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("feed responded with status {0}")]
    Status(u16),

    #[error("feed body could not be read: {0}")]
    Body(#[source] reqwest::Error),
}

/// The on-disk seen store could not be read or rewritten.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read seen store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write seen store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to replace seen store {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single webhook delivery failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("webhook payload could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("webhook rejected payload with status {0}")]
    Status(u16),
}

/// A poll cycle aborted before dispatching anything.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
