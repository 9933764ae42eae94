//! Transport seam between the session client and the network
//!
//! The client never talks to `reqwest` directly; it hands a fully built
//! [`TransportRequest`] to a [`Transport`] and gets the raw status,
//! headers and body back. Tests swap in their own transport.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use thiserror::Error;

/// Boxed error used as the source of transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request ready to go on the wire
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Raw response as received from the server
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response with no headers and an empty body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self
    }

    /// Attach a header
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Transport failure before any response was received
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server could not be contacted (connection refused, DNS failure, offline)
    #[error("Failed to fetch: {0}")]
    Unreachable(#[source] BoxError),

    /// Any other failure raised while sending or reading the response
    #[error("Transport failure: {0}")]
    Other(#[source] BoxError),
}

impl TransportError {
    /// Create an unreachable error
    pub fn unreachable(source: impl Into<BoxError>) -> Self {
        Self::Unreachable(source.into())
    }

    /// Create an unclassified error
    pub fn other(source: impl Into<BoxError>) -> Self {
        Self::Other(source.into())
    }
}

/// Anything able to send an HTTP request and return the raw response
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(feature = "client")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "client")]
mod reqwest_transport {
    use super::{Transport, TransportError, TransportRequest, TransportResponse};
    use crate::client::{ClientConfig, ClientError};
    use async_trait::async_trait;
    use reqwest::{Client, ClientBuilder};

    /// [`Transport`] backed by a `reqwest::Client`
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        /// Build a transport honouring the timeout and user agent in `config`
        #[cfg_attr(target_arch = "wasm32", allow(unused_variables))]
        pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
            #[cfg(not(target_arch = "wasm32"))]
            let client = {
                let mut builder = ClientBuilder::new().user_agent(config.user_agent.clone());
                if let Some(timeout) = config.timeout() {
                    builder = builder.timeout(timeout);
                }
                builder.build()
            };

            #[cfg(target_arch = "wasm32")]
            let client = ClientBuilder::new().build();

            let client = client.map_err(|e| {
                ClientError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;
            Ok(Self { client })
        }
    }

    fn classify(error: reqwest::Error) -> TransportError {
        #[cfg(not(target_arch = "wasm32"))]
        let unreachable = error.is_connect();
        #[cfg(target_arch = "wasm32")]
        let unreachable = error.is_request();

        if unreachable {
            TransportError::unreachable(error)
        } else {
            TransportError::other(error)
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
    #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
    impl Transport for ReqwestTransport {
        async fn send(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            let mut builder = self
                .client
                .request(request.method, &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(classify)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(TransportError::other)?;

            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        }
    }
}
