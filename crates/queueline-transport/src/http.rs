//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};

use crate::{HttpRequest, HttpResponse, Transport, TransportError};

/// Where and how patiently to talk to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Full GraphQL endpoint URL, e.g. `http://127.0.0.1:8000/graphql/`.
    pub endpoint: String,
    /// Upper bound for one whole request.
    pub request_timeout: Duration,
    /// Upper bound for establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/graphql/".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// A [`Transport`] that `POST`s JSON bodies to a single endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    /// Returns [`TransportError::ClientBuild`] if `reqwest` rejects the
    /// configuration.
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        tracing::debug!(endpoint = %config.endpoint, "HTTP transport ready");
        Ok(Self {
            http,
            endpoint: config.endpoint,
        })
    }

    /// The endpoint every request goes to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let id = request.id;
        let mut builder = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body);

        if let Some(auth) = request.authorization {
            let mut value = HeaderValue::from_str(&auth)
                .map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        tracing::debug!(%id, status, body_len = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}

/// Maps a `reqwest` failure onto the transport taxonomy.
fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}
