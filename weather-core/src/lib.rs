//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Bounded outbound HTTP calls and city geocoding
//! - A generic fetch for current weather and daily forecasts
//! - The tracked-cities / units preference document and its storage
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod http;
pub mod model;
pub mod preferences;
pub mod service;
pub mod storage;
pub mod validation;

pub use config::{Config, Endpoints, StorageConfig};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{WeatherFetcher, WeatherSchema};
pub use geocode::GeocodeResolver;
pub use http::{HttpResponse, ReqwestTransport, RequestExecutor, Transport};
pub use model::{Coordinate, CurrentWeather, Forecast, Preferences, Units, UnitsUpdate};
pub use preferences::PreferenceManager;
pub use service::WeatherService;
pub use storage::{JsonFileStore, MemoryStore, PreferenceStore};
