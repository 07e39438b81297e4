//! Single-attempt outbound HTTP calls with a fixed deadline.

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{Error, Result};
use crate::validation::validate_url;

/// Deadline applied to every outbound call, measured from call start.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A fully-read response. The body is owned, so nothing needs closing.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Performs the raw network exchange for an already validated URL.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::RequestBuild)?;

        Ok(Self { http, timeout })
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            Error::Transport(e)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<HttpResponse> {
        let mut builder = self.http.request(method, url.clone());
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let request = builder.build().map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to create HTTP request");
            Error::RequestBuild(e)
        })?;

        let res = self.http.execute(request).await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to perform HTTP request");
            self.transport_error(e)
        })?;

        let status = res.status();
        let body = res.bytes().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to read response body");
            self.transport_error(e)
        })?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Validates outbound URLs and runs each call through a [`Transport`]
/// under a fixed deadline. No retries.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(
        &self,
        method: Method,
        raw_url: &str,
        body: Option<String>,
    ) -> Result<HttpResponse> {
        let url = validate_url(raw_url)?;
        tracing::debug!(%method, url = %url, "Sending request");

        let res = tokio::time::timeout(self.timeout, self.transport.send(method, url, body))
            .await
            .map_err(|_| {
                tracing::error!(url = raw_url, timeout = ?self.timeout, "HTTP request timed out");
                Error::Timeout(self.timeout)
            })??;

        if !res.status.is_success() {
            tracing::warn!(url = raw_url, status = %res.status, "Upstream returned non-success status");
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct SlowTransport {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn send(&self, _: Method, _: Url, _: Option<String>) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(HttpResponse {
                status: StatusCode::OK,
                body: b"{}".to_vec(),
            })
        }
    }

    #[tokio::test]
    async fn invalid_url_fails_before_transport() {
        let transport = Arc::new(SlowTransport::default());
        let executor = RequestExecutor::new(transport.clone());

        let err = executor
            .execute(Method::GET, "http://insecure.example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidUrl(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_transport_hits_deadline() {
        let transport = Arc::new(SlowTransport {
            calls: AtomicUsize::new(0),
            delay: REQUEST_TIMEOUT + Duration::from_secs(1),
        });
        let executor = RequestExecutor::new(transport.clone());

        let err = executor
            .execute(Method::GET, "https://api.example.com/slow", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(t) if t == REQUEST_TIMEOUT));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_transport_returns_response() {
        let transport = Arc::new(SlowTransport {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(1),
        });
        let executor = RequestExecutor::new(transport);

        let res = executor
            .execute(Method::GET, "https://api.example.com/fast", None)
            .await
            .expect("response");

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, b"{}");
    }

    #[tokio::test(start_paused = true)]
    async fn custom_deadline_is_honoured() {
        let transport = Arc::new(SlowTransport {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(2),
        });
        let executor = RequestExecutor::new(transport).with_timeout(Duration::from_secs(1));

        let err = executor
            .execute(Method::POST, "https://api.example.com/slow", Some("{}".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout(t) if t == Duration::from_secs(1)));
    }
}
