//! Shopfront HTTP client
//!
//! A session-aware wrapper over an HTTP transport for the Shopfront REST
//! API. The [`client::SessionClient`] attaches the bearer token while it
//! is valid, applies server-pushed token refreshes from the `X-New-Token`
//! response header, and clears the persisted session when the server
//! answers `401 Unauthorized`.

pub mod client;
pub mod types;

pub use client::{
    ClientConfig, RequestConfig, Session, SessionClient, SessionClientBuilder,
    error::ClientError,
    transport::{Transport, TransportError, TransportRequest, TransportResponse},
};

#[cfg(feature = "client")]
pub use client::transport::ReqwestTransport;
