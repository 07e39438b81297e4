#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode};
use url::Url;
use weather_core::{Endpoints, HttpResponse, Result, Transport};

pub const GEO_HOST: &str = "geo.example.com";
pub const WX_HOST: &str = "wx.example.com";

pub fn endpoints() -> Endpoints {
    Endpoints {
        geocode: format!("https://{GEO_HOST}/v1/search?name={{city}}&count=1"),
        current_weather: format!(
            "https://{WX_HOST}/v1/forecast?latitude={{latitude}}&longitude={{longitude}}&current_weather=true"
        ),
        forecast: format!(
            "https://{WX_HOST}/v1/forecast?latitude={{latitude}}&longitude={{longitude}}&daily=temperature_2m_max"
        ),
    }
}

/// Answers by host with canned JSON and records every URL it is asked for.
#[derive(Debug, Default)]
pub struct StubTransport {
    geocode_body: String,
    weather_body: String,
    requests: Mutex<Vec<Url>>,
}

impl StubTransport {
    pub fn new(geocode_body: impl Into<String>, weather_body: impl Into<String>) -> Self {
        Self {
            geocode_body: geocode_body.into(),
            weather_body: weather_body.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, host: &str) -> Vec<Url> {
        self.requests()
            .into_iter()
            .filter(|url| url.host_str() == Some(host))
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, method: Method, url: Url, _body: Option<String>) -> Result<HttpResponse> {
        assert_eq!(method, Method::GET);
        self.requests.lock().push(url.clone());

        let body = match url.host_str() {
            Some(GEO_HOST) => self.geocode_body.clone(),
            Some(WX_HOST) => self.weather_body.clone(),
            other => panic!("unexpected host {other:?}"),
        };

        Ok(HttpResponse {
            status: StatusCode::OK,
            body: body.into_bytes(),
        })
    }
}

pub fn halifax_geocode() -> String {
    serde_json::json!({
        "results": [
            {"name": "Halifax", "latitude": 44.64533, "longitude": -63.57239},
            {"name": "Halifax", "latitude": 53.71667, "longitude": -1.85}
        ]
    })
    .to_string()
}
