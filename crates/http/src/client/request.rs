//! Per-call request configuration

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use super::ClientError;

/// Everything the request primitive needs to issue one call
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    /// Path below the base address, including any query string
    pub path: String,
    /// Serialized JSON body
    pub body: Option<String>,
    /// Headers laid over the defaults; a caller header replaces a default of the same name
    pub headers: HeaderMap,
    /// Attach the bearer token when one is valid
    pub require_auth: bool,
}

impl RequestConfig {
    /// Authenticated request with no body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            require_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serialize `body` as the JSON request body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_string(body).map_err(ClientError::Serialization)?);
        Ok(self)
    }

    /// Append query parameters built from `query`, omitting absent entries
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, ClientError> {
        let encoded = encode_query(query)?;
        if !encoded.is_empty() {
            let separator = if self.path.contains('?') { '&' } else { '?' };
            self.path.push(separator);
            self.path.push_str(&encoded);
        }
        Ok(self)
    }

    /// Add a header, replacing the default of the same name
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Never attach the bearer token
    #[must_use]
    pub fn public(mut self) -> Self {
        self.require_auth = false;
        self
    }

    /// Path without its query string
    pub fn route(&self) -> &str {
        self.path.split_once('?').map_or(self.path.as_str(), |(route, _)| route)
    }
}

/// Encode the fields of `query` as a URL query string.
///
/// `query` must serialize to a JSON object. `null` fields are skipped,
/// strings are used verbatim and other scalars use their JSON text.
pub fn encode_query<Q: Serialize + ?Sized>(query: &Q) -> Result<String, ClientError> {
    let value = serde_json::to_value(query).map_err(ClientError::Serialization)?;
    let Value::Object(fields) = value else {
        return Err(ClientError::Configuration(
            "query parameters must serialize to an object".into(),
        ));
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::String(s) => {
                serializer.append_pair(&key, &s);
            }
            other => {
                serializer.append_pair(&key, &other.to_string());
            }
        }
    }
    Ok(serializer.finish())
}
