//! One fetch routine for every weather-shaped response.

use reqwest::Method;
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::{Error, Result};
use crate::geocode::GeocodeResolver;
use crate::http::RequestExecutor;
use crate::model::{Coordinate, CurrentWeather, Forecast};

pub const LATITUDE_PLACEHOLDER: &str = "{latitude}";
pub const LONGITUDE_PLACEHOLDER: &str = "{longitude}";

/// A domain value decoded from a weather endpoint.
///
/// `Payload` is the wire shape; `from_payload` turns it into `Self`.
pub trait WeatherSchema: Sized + Send {
    type Payload: DeserializeOwned;

    /// Used in log lines.
    const LABEL: &'static str;

    fn from_payload(payload: Self::Payload) -> Result<Self>;
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherPayload {
    current_weather: CurrentWeatherBody,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherBody {
    temperature: f64,
    windspeed: f64,
}

impl WeatherSchema for CurrentWeather {
    type Payload = CurrentWeatherPayload;
    const LABEL: &'static str = "current weather";

    fn from_payload(payload: Self::Payload) -> Result<Self> {
        Ok(CurrentWeather {
            temperature: payload.current_weather.temperature,
            wind_speed: payload.current_weather.windspeed,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastPayload {
    daily: ForecastDaily,
}

#[derive(Debug, Deserialize)]
struct ForecastDaily {
    time: Vec<String>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

impl WeatherSchema for Forecast {
    type Payload = ForecastPayload;
    const LABEL: &'static str = "forecast";

    fn from_payload(payload: Self::Payload) -> Result<Self> {
        let ForecastDaily {
            time,
            temperature_2m_max,
            temperature_2m_min,
        } = payload.daily;

        if temperature_2m_max.len() != time.len() || temperature_2m_min.len() != time.len() {
            return Err(Error::Decode(format!(
                "forecast series lengths differ: {} dates, {} max, {} min",
                time.len(),
                temperature_2m_max.len(),
                temperature_2m_min.len(),
            )));
        }

        Ok(Forecast {
            dates: time,
            max_temps: temperature_2m_max,
            min_temps: temperature_2m_min,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    geocoder: GeocodeResolver,
    executor: RequestExecutor,
}

impl WeatherFetcher {
    pub fn new(geocoder: GeocodeResolver, executor: RequestExecutor) -> Self {
        Self { geocoder, executor }
    }

    /// Geocode `city`, fill `template` with its coordinates and decode the
    /// response as `T`.
    pub async fn fetch<T: WeatherSchema>(&self, city: &str, template: &str) -> Result<T> {
        if city.is_empty() {
            return Err(Error::CityRequired);
        }

        let coordinate = self.geocoder.resolve(city).await?;
        let url = weather_url(template, coordinate);

        let res = self
            .executor
            .execute(Method::GET, &url, None)
            .await
            .inspect_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to get {}", T::LABEL);
            })?;

        let payload = serde_json::from_slice::<T::Payload>(&res.body).map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to decode {}", T::LABEL);
            Error::Decode(e.to_string())
        })?;

        T::from_payload(payload)
    }
}

fn weather_url(template: &str, coordinate: Coordinate) -> String {
    template
        .replace(LATITUDE_PLACEHOLDER, &format!("{:.6}", coordinate.latitude))
        .replace(LONGITUDE_PLACEHOLDER, &format!("{:.6}", coordinate.longitude))
}
