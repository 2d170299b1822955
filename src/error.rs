//! Error taxonomy for the planner core.
//!
//! None of these are fatal to a caller: routing and elevation failures are
//! converted into fallback results before they leave the core.

use std::io;

use thiserror::Error;

/// Failure talking to the walking-path routing capability.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoutingError {
    /// Network call failed or timed out, or returned a non-success status.
    #[error("routing transport failed: {0}")]
    Transport(String),
    /// Response could not be decoded or did not describe a usable route.
    #[error("malformed routing response: {0}")]
    Format(String),
    /// Routing capability answered with `success = false`.
    #[error("routing capability rejected request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RoutingError::Format(err.to_string())
        } else {
            RoutingError::Transport(err.to_string())
        }
    }
}

/// Failure talking to an elevation capability.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ElevationError {
    #[error("elevation transport failed: {0}")]
    Transport(String),
    #[error("malformed elevation response: {0}")]
    Format(String),
}

impl From<reqwest::Error> for ElevationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ElevationError::Format(err.to_string())
        } else {
            ElevationError::Transport(err.to_string())
        }
    }
}

/// Failure reading or writing the durable elevation cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("elevation store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("elevation store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
