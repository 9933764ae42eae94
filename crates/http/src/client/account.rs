//! Account API client methods

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use super::session::refresh_validity;
use super::{ClientError, LOGIN_PATH, RequestConfig, SIGNUP_PATH, SessionClient};
use crate::types::{AuthResponse, LoginRequest, SignupRequest};

impl SessionClient {
    /// Create an account. A token in the response starts a session right away.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let config = RequestConfig::post(SIGNUP_PATH).json(request)?.public();
        let response = parse_auth_response(self.request(config).await?);
        self.capture_credentials(&response)?;
        Ok(response)
    }

    /// Log in and store the returned token
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let config = RequestConfig::post(LOGIN_PATH).json(request)?.public();
        let response = parse_auth_response(self.request(config).await?);
        self.capture_credentials(&response)?;
        info!(email = %request.email, "Logged in");
        Ok(response)
    }

    /// Log out on the server. Local session state is cleared whatever the outcome.
    pub async fn logout(&self) -> Result<Value, ClientError> {
        let result = self.request(RequestConfig::post("/account/logout")).await;
        self.session().clear();
        if let Err(e) = &result {
            warn!(error = %e, "Remote logout failed, local session cleared anyway");
        }
        result
    }

    /// Delete the current account and forget the session
    pub async fn delete_account(&self) -> Result<Value, ClientError> {
        let body = self.request(RequestConfig::delete("/account")).await?;
        self.session().clear();
        info!("Account deleted");
        Ok(body)
    }

    fn capture_credentials(&self, response: &AuthResponse) -> Result<(), ClientError> {
        let Some(token) = response.token.as_deref() else {
            return Ok(());
        };

        let session = self.session();
        session.set_credential(Some(token))?;
        let expiry = response
            .expires_at
            .unwrap_or_else(|| Utc::now() + refresh_validity());
        session.set_expiry(expiry)?;

        if let Some(user) = &response.user {
            session.cache_user(user)?;
        }
        Ok(())
    }
}

/// Read a login or signup body. Only `token` is load-bearing; a profile or
/// expiry of an unexpected shape is dropped with a warning.
fn parse_auth_response(body: Value) -> AuthResponse {
    let token = body.get("token").and_then(Value::as_str).map(str::to_string);
    if token.is_none() {
        warn!("Auth response carries no token");
    }

    let expires_at = body.get("expiresAt").and_then(|raw| {
        let parsed = parse_expiry(raw);
        if parsed.is_none() && !raw.is_null() {
            warn!(value = %raw, "Ignoring unreadable expiresAt");
        }
        parsed
    });

    let user = match body.get("user") {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring user profile of unexpected shape");
                None
            }
        },
    };

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    AuthResponse {
        token,
        expires_at,
        user,
        message,
    }
}

/// RFC 3339 text, or a Unix timestamp in seconds or milliseconds
fn parse_expiry(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|expiry| expiry.with_timezone(&Utc)),
        Value::Number(n) => {
            let n = n.as_i64()?;
            if n.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(n)
            } else {
                DateTime::from_timestamp(n, 0)
            }
        }
        _ => None,
    }
}
