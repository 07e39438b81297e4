//! City name → coordinates via the configured geocoding endpoint.

use reqwest::Method;
use serde::Deserialize;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::http::RequestExecutor;
use crate::model::Coordinate;

pub const CITY_PLACEHOLDER: &str = "{city}";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone)]
pub struct GeocodeResolver {
    executor: RequestExecutor,
    template: String,
}

impl GeocodeResolver {
    pub fn new(executor: RequestExecutor, template: impl Into<String>) -> Self {
        Self {
            executor,
            template: template.into(),
        }
    }

    /// Resolve `city` to the first coordinate the service returns.
    ///
    /// The name is passed upstream verbatim apart from query escaping.
    pub async fn resolve(&self, city: &str) -> Result<Coordinate> {
        let url = geocode_url(&self.template, city);

        let res = self
            .executor
            .execute(Method::GET, &url, None)
            .await
            .inspect_err(|e| tracing::error!(city, error = %e, "Failed to fetch geocode"))?;

        let first = serde_json::from_slice::<GeocodeResponse>(&res.body)
            .ok()
            .and_then(|data| data.results.into_iter().next())
            .ok_or_else(|| {
                tracing::error!(city, "No geocode results");
                Error::NoResultsForCity(city.to_string())
            })?;

        tracing::debug!(city, latitude = first.latitude, longitude = first.longitude, "Resolved geocode");

        Ok(Coordinate {
            latitude: first.latitude,
            longitude: first.longitude,
        })
    }
}

fn geocode_url(template: &str, city: &str) -> String {
    let escaped: String = form_urlencoded::byte_serialize(city.as_bytes()).collect();
    template.replace(CITY_PLACEHOLDER, &escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://geo.example.com/v1/search?name={city}&count=1";

    #[test]
    fn city_is_query_escaped() {
        assert_eq!(
            geocode_url(TEMPLATE, "New York"),
            "https://geo.example.com/v1/search?name=New+York&count=1"
        );
        assert_eq!(
            geocode_url(TEMPLATE, "a&b=c"),
            "https://geo.example.com/v1/search?name=a%26b%3Dc&count=1"
        );
    }

    #[test]
    fn city_case_is_preserved() {
        assert!(geocode_url(TEMPLATE, "hALIFAX").contains("name=hALIFAX&"));
    }

    #[test]
    fn missing_results_decode_as_empty() {
        let parsed: GeocodeResponse = serde_json::from_str(r#"{"generationtime_ms": 0.5}"#)
            .expect("results is optional");
        assert!(parsed.results.is_empty());
    }
}
