//! The operations exposed to an outer layer (HTTP routes, the CLI).

use std::sync::Arc;

use crate::config::{Config, Endpoints};
use crate::error::Result;
use crate::fetch::WeatherFetcher;
use crate::geocode::GeocodeResolver;
use crate::http::{ReqwestTransport, RequestExecutor, Transport};
use crate::model::{CurrentWeather, Forecast, Preferences, UnitsUpdate};
use crate::preferences::PreferenceManager;
use crate::storage::{JsonFileStore, PreferenceStore};

#[derive(Debug, Clone)]
pub struct WeatherService {
    fetcher: WeatherFetcher,
    preferences: PreferenceManager,
    endpoints: Endpoints,
}

impl WeatherService {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn PreferenceStore>,
        endpoints: Endpoints,
    ) -> Self {
        let executor = RequestExecutor::new(transport);
        let geocoder = GeocodeResolver::new(executor.clone(), endpoints.geocode.clone());

        Self {
            fetcher: WeatherFetcher::new(geocoder, executor),
            preferences: PreferenceManager::new(store),
            endpoints,
        }
    }

    /// Production wiring: reqwest transport and a JSON preferences file.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let transport = ReqwestTransport::new()?;
        let store = JsonFileStore::new(config.preferences_path()?);
        tracing::debug!(path = %store.path().display(), "Using preferences file");

        Ok(Self::new(
            Arc::new(transport),
            Arc::new(store),
            config.endpoints.clone(),
        ))
    }

    pub async fn current_weather(&self, city: &str) -> Result<CurrentWeather> {
        self.fetcher
            .fetch(city, &self.endpoints.current_weather)
            .await
            .inspect_err(|e| tracing::error!(city, error = %e, "Failed to get weather data"))
    }

    pub async fn forecast(&self, city: &str) -> Result<Forecast> {
        self.fetcher
            .fetch(city, &self.endpoints.forecast)
            .await
            .inspect_err(|e| tracing::error!(city, error = %e, "Failed to get forecast data"))
    }

    pub fn preferences(&self) -> Result<Preferences> {
        self.preferences.get()
    }

    pub fn add_cities(&self, raw: &str) -> Result<Preferences> {
        self.preferences.add_cities(raw)
    }

    pub fn delete_cities(&self, raw: &str) -> Result<Vec<String>> {
        self.preferences.delete_cities(raw)
    }

    pub fn update_units(&self, candidate: &str) -> Result<UnitsUpdate> {
        self.preferences.update_units(candidate)
    }
}
