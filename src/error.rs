//! Error types for SkyGrid.

use thiserror::Error;

/// Errors raised by the spatial directory and its collaborators.
#[derive(Debug, Error)]
pub enum SkyGridError {
    /// A coordinate outside latitude [-90e6, 90e6] / longitude [-180e6, 180e6]
    #[error("Invalid coordinate: lat {lat}, lng {lng} (micro-degrees)")]
    InvalidCoordinate { lat: i32, lng: i32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The coverage search was cancelled before it finished
    #[error("Coverage search aborted")]
    Aborted,

    /// Failure reported by a point store, passed through untouched
    #[error("Point store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SkyGridError>;
