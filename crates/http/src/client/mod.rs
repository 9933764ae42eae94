//! Shopfront session-aware HTTP client
//!
//! Every resource method funnels into [`SessionClient::request`], which
//! owns the token lifecycle:
//!
//! 1. the bearer token is attached while it is present and unexpired,
//! 2. an `X-New-Token` response header replaces the token and pushes the
//!    expiry one day out, whatever the response status,
//! 3. a `401` clears the persisted session and surfaces as
//!    [`ClientError::SessionExpired`] (login and signup excepted),
//! 4. an unreachable server surfaces as [`ClientError::Connection`].

pub mod account;
pub mod config;
pub mod error;
pub mod orders;
pub mod products;
pub mod purchases;
pub mod request;
pub mod session;
pub mod transport;
pub mod users;

pub use config::ClientConfig;
pub use error::ClientError;
pub use request::RequestConfig;
pub use session::Session;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shopfront_core::{KeyValueStore, MemoryStore};
use tracing::{debug, error, warn};

use transport::{Transport, TransportError, TransportRequest};

/// Response header carrying a server-issued replacement token
pub const NEW_TOKEN_HEADER: &str = "x-new-token";

/// Login endpoint; a 401 here means bad credentials, not an expired session
pub const LOGIN_PATH: &str = "/account/login";

/// Signup endpoint; same 401 semantics as login
pub const SIGNUP_PATH: &str = "/account/signup";

/// Callback invoked whenever the server declares the session expired
pub type SessionExpiredListener = Arc<dyn Fn() + Send + Sync>;

/// Session-aware Shopfront API client
///
/// Clones share the transport and the session, so a token refreshed
/// through one clone is used by all of them.
#[derive(Clone)]
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    base_url: String,
    on_session_expired: Option<SessionExpiredListener>,
}

impl SessionClient {
    /// Create a client with default configuration and an in-memory store
    #[cfg(feature = "client")]
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential state backing this client
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the persisted expiry has passed (or is missing)
    pub fn is_expired(&self) -> bool {
        self.session.is_expired()
    }

    /// Whether a usable token is present
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Replace or clear the bearer token
    pub fn set_credential(&self, token: Option<&str>) -> Result<(), ClientError> {
        Ok(self.session.set_credential(token)?)
    }

    /// Default headers for a request.
    ///
    /// Always declares a JSON content type. The `Authorization` header is
    /// added only when `include_auth` is set and the token is present and
    /// unexpired.
    pub fn build_headers(&self, include_auth: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !include_auth {
            return headers;
        }
        let Some(token) = self.session.token() else {
            return headers;
        };
        if self.session.is_expired() {
            debug!("Token expired, sending request without credentials");
            return headers;
        }

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored token is not a valid header value, omitting it"),
        }
        headers
    }

    /// Issue a request and return the parsed JSON body
    pub async fn request(&self, config: RequestConfig) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, config.path);
        let route = config.route().to_string();

        let mut headers = self.build_headers(config.require_auth);
        for name in config.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &config.headers {
            headers.append(name.clone(), value.clone());
        }

        debug!(
            method = %config.method,
            path = %config.path,
            authenticated = headers.contains_key(AUTHORIZATION),
            "Sending request"
        );

        let request = TransportRequest {
            method: config.method,
            url,
            headers,
            body: config.body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(TransportError::Unreachable(source)) => {
                warn!(path = %route, error = %source, "Server unreachable");
                return Err(ClientError::Connection(TransportError::Unreachable(source)));
            }
            Err(err) => {
                error!(path = %route, error = %err, "Request failed");
                return Err(ClientError::Transport(err));
            }
        };

        // Must run before the status check so error responses still refresh the token
        self.apply_token_refresh(&response.headers);

        let body = parse_body(&response.body);

        if !response.status.is_success() {
            return Err(self.handle_failure(response.status, &route, body.as_ref().ok()));
        }

        body.map_err(|e| {
            warn!(path = %route, error = %e, "Response body is not valid JSON");
            ClientError::InvalidResponse(e)
        })
    }

    /// Issue a request and deserialize the body into `T`
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        let value = self.request(config).await?;
        serde_json::from_value(value).map_err(|e| {
            warn!(error = %e, "Response body has an unexpected shape");
            ClientError::InvalidResponse(e)
        })
    }

    fn apply_token_refresh(&self, headers: &HeaderMap) {
        let Some(value) = headers.get(NEW_TOKEN_HEADER) else {
            return;
        };

        match value.to_str() {
            Ok(token) if !token.is_empty() => {
                debug!("Server issued a refreshed token");
                if let Err(e) = self.session.apply_refresh(token, Utc::now()) {
                    warn!(error = %e, "Failed to persist refreshed token");
                }
            }
            _ => warn!("Ignoring malformed x-new-token header"),
        }
    }

    fn handle_failure(&self, status: StatusCode, route: &str, body: Option<&Value>) -> ClientError {
        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %route, "Server rejected credentials, clearing session");
            self.session.clear();

            if !is_auth_bootstrap(route) {
                if let Some(listener) = &self.on_session_expired {
                    listener();
                }
                return ClientError::SessionExpired;
            }
        }

        let err = ClientError::from_status(status, body);
        warn!(status = status.as_u16(), path = %route, error = %err, "Request failed");
        err
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Endpoints where no session exists yet
fn is_auth_bootstrap(route: &str) -> bool {
    let route = route.trim_end_matches('/');
    route == LOGIN_PATH || route == SIGNUP_PATH
}

/// Parse a response body; an empty body is `null`
fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(body)
    }
}

/// Builder for SessionClient
#[derive(Default)]
pub struct SessionClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn KeyValueStore>>,
    on_session_expired: Option<SessionExpiredListener>,
}

impl SessionClientBuilder {
    /// Start from an existing configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout used by the default transport
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs();
        self
    }

    /// Set the user agent used by the default transport
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Use a custom transport instead of reqwest
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Persist session state in `store` (defaults to an in-memory store)
    #[must_use]
    pub fn store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Register a callback fired whenever a request fails with `SessionExpired`
    #[must_use]
    pub fn on_session_expired(mut self, listener: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(listener));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SessionClient, ClientError> {
        let base_url = self.config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }
        url::Url::parse(&base_url).map_err(|e| {
            ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}"))
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.config)?,
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        Ok(SessionClient {
            transport,
            session: Arc::new(Session::load(store)),
            base_url,
            on_session_expired: self.on_session_expired,
        })
    }
}

#[cfg(feature = "client")]
fn default_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>, ClientError> {
    Ok(Arc::new(transport::ReqwestTransport::new(config)?))
}

#[cfg(not(feature = "client"))]
fn default_transport(_config: &ClientConfig) -> Result<Arc<dyn Transport>, ClientError> {
    Err(ClientError::Configuration(
        "no transport configured and the `client` feature is disabled".into(),
    ))
}
