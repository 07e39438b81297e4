//! Failure conditions returned by every core operation.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Coarse classification used by boundary layers (HTTP handlers, the CLI)
/// to turn an [`Error`] into a status or exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input: empty city, malformed or insecure URL, unknown unit.
    Validation,
    /// The geocoding or weather service failed or returned nothing usable.
    Upstream,
    /// The preference document could not be opened, decoded or written.
    Storage,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("city is required")]
    CityRequired,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid unit type: {0}")]
    InvalidUnit(String),

    #[error("no results for city: {0}")]
    NoResultsForCity(String),

    #[error("failed to create HTTP request: {0}")]
    RequestBuild(#[source] reqwest::Error),

    #[error("failed to perform HTTP request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to decode weather data: {0}")]
    Decode(String),

    #[error("failed to open {}: {source}", path.display())]
    StorageOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    StorageDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CityRequired | Self::InvalidUrl(_) | Self::InvalidUnit(_) => {
                ErrorKind::Validation
            }
            Self::NoResultsForCity(_)
            | Self::RequestBuild(_)
            | Self::Transport(_)
            | Self::Timeout(_)
            | Self::Decode(_) => ErrorKind::Upstream,
            Self::StorageOpen { .. } | Self::StorageDecode { .. } | Self::StorageWrite { .. } => {
                ErrorKind::Storage
            }
        }
    }

    /// Short message suitable for end users; the full chain goes to the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::CityRequired => "Please provide a city name.".to_string(),
            Self::InvalidUrl(_) => "A weather service URL is misconfigured.".to_string(),
            Self::InvalidUnit(unit) => {
                format!("Unknown unit '{unit}'. Use 'metric' or 'imperial'.")
            }
            Self::NoResultsForCity(city) => format!("Could not find a city named '{city}'."),
            Self::RequestBuild(_) | Self::Transport(_) => {
                "Weather service is unreachable. Check your connection.".to_string()
            }
            Self::Timeout(_) => "Weather service did not respond in time.".to_string(),
            Self::Decode(_) => "Weather service returned an unexpected response.".to_string(),
            Self::StorageOpen { .. } | Self::StorageDecode { .. } | Self::StorageWrite { .. } => {
                "Could not access your saved preferences.".to_string()
            }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
