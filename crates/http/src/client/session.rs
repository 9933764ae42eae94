//! Credential state shared between the in-memory client and the persistent store

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use shopfront_core::{KeyValueStore, StorageResult, keys};
use tracing::{debug, warn};

use crate::types::User;

/// Validity assumed for a token pushed through `X-New-Token`, in hours
const REFRESH_VALIDITY_HOURS: i64 = 24;

/// Validity window applied to a freshly issued token
pub fn refresh_validity() -> Duration {
    Duration::hours(REFRESH_VALIDITY_HOURS)
}

/// Bearer token and expiry, mirrored into a [`KeyValueStore`]
///
/// The token is loaded from the store once, at construction, and kept in
/// memory afterwards. The expiry is never cached: every check reads it
/// back from the store, so another writer (a second tab, a second
/// process) shortening it takes effect immediately.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    token: ArcSwapOption<String>,
}

impl Session {
    /// Create a session over `store`, picking up a previously persisted token
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let token = match store.get(keys::TOKEN) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token, starting unauthenticated");
                None
            }
        };
        debug!(has_token = token.is_some(), "Loaded session");

        Self {
            store,
            token: ArcSwapOption::from(token.map(Arc::new)),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Current in-memory token
    pub fn token(&self) -> Option<Arc<String>> {
        self.token.load_full()
    }

    /// Persisted expiry, `None` when absent or unreadable
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let raw = match self.store.get(keys::TOKEN_EXPIRY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read token expiry");
                return None;
            }
        };

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(expiry) => Some(expiry.with_timezone(&Utc)),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring malformed token expiry");
                None
            }
        }
    }

    /// Whether the token must be considered expired right now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token is expired at `now`. A missing expiry counts as expired
    /// and the boundary is inclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry().is_none_or(|expiry| now >= expiry)
    }

    /// Whether a token is present and not expired
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && !self.is_expired()
    }

    /// Replace or clear the token. The expiry is left untouched.
    pub fn set_credential(&self, token: Option<&str>) -> StorageResult<()> {
        match token {
            Some(token) => {
                self.store.set(keys::TOKEN, token)?;
                self.token.store(Some(Arc::new(token.to_string())));
            }
            None => {
                self.token.store(None);
                self.store.remove(keys::TOKEN)?;
            }
        }
        Ok(())
    }

    /// Persist a new expiry instant
    pub fn set_expiry(&self, expiry: DateTime<Utc>) -> StorageResult<()> {
        self.store.set(
            keys::TOKEN_EXPIRY,
            &expiry.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    /// Delete the persisted expiry
    pub fn clear_expiry(&self) -> StorageResult<()> {
        self.store.remove(keys::TOKEN_EXPIRY)
    }

    /// Store a token pushed by the server, valid for one day from `now`.
    ///
    /// The token and the expiry are written independently; the first
    /// failure is reported after both have been attempted.
    pub fn apply_refresh(&self, token: &str, now: DateTime<Utc>) -> StorageResult<()> {
        let token_result = self.set_credential(Some(token));
        let expiry_result = self.set_expiry(now + refresh_validity());
        token_result.and(expiry_result)
    }

    /// Last cached user profile
    pub fn cached_user(&self) -> Option<User> {
        let raw = self.store.get(keys::USER).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed cached user profile");
                None
            }
        }
    }

    /// Cache a user profile
    pub fn cache_user(&self, user: &User) -> StorageResult<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(keys::USER, &raw)
    }

    /// Delete the cached user profile
    pub fn clear_cached_user(&self) -> StorageResult<()> {
        self.store.remove(keys::USER)
    }

    /// Drop the token, the expiry and the cached profile.
    ///
    /// Every step is attempted; storage failures are logged, not returned.
    pub fn clear(&self) {
        if let Err(e) = self.set_credential(None) {
            warn!(error = %e, "Failed to delete persisted token");
        }
        if let Err(e) = self.clear_cached_user() {
            warn!(error = %e, "Failed to delete cached user profile");
        }
        if let Err(e) = self.clear_expiry() {
            warn!(error = %e, "Failed to delete token expiry");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &self.token().is_some())
            .field("expiry", &self.expiry())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::MemoryStore;

    fn session_with(entries: &[(&str, &str)]) -> (Session, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        (Session::load(store.clone()), store)
    }

    #[test]
    fn test_load_picks_up_persisted_token() {
        let (session, _) = session_with(&[("token", "abc")]);
        assert_eq!(session.token().as_deref().map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_missing_expiry_counts_as_expired() {
        let (session, _) = session_with(&[("token", "abc")]);
        assert!(session.is_expired());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let (session, _) = session_with(&[]);
        let expiry = Utc::now() + Duration::minutes(5);
        session.set_expiry(expiry).unwrap();
        let expiry = session.expiry().unwrap();

        assert!(!session.is_expired_at(expiry - Duration::milliseconds(1)));
        assert!(session.is_expired_at(expiry));
        assert!(session.is_expired_at(expiry + Duration::seconds(1)));
    }

    #[test]
    fn test_malformed_expiry_counts_as_expired() {
        let (session, _) = session_with(&[("token", "abc"), ("tokenExpiry", "tomorrow")]);
        assert!(session.expiry().is_none());
        assert!(session.is_expired());
    }

    #[test]
    fn test_set_credential_leaves_expiry_alone() {
        let (session, store) = session_with(&[("tokenExpiry", "2030-01-01T00:00:00Z")]);

        session.set_credential(Some("abc")).unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

        session.set_credential(None).unwrap();
        assert!(session.token().is_none());
        assert_eq!(store.get("token").unwrap(), None);
        assert_eq!(
            store.get("tokenExpiry").unwrap().as_deref(),
            Some("2030-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_apply_refresh_sets_one_day_expiry() {
        let (session, store) = session_with(&[("token", "old")]);
        let now = Utc::now();

        session.apply_refresh("new", now).unwrap();

        assert_eq!(store.get("token").unwrap().as_deref(), Some("new"));
        let expiry = session.expiry().unwrap();
        let drift = (expiry - (now + Duration::days(1))).num_milliseconds().abs();
        assert!(drift <= 1, "expiry drifted by {drift}ms");
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_clear_removes_everything() {
        let (session, store) = session_with(&[
            ("token", "abc"),
            ("tokenExpiry", "2030-01-01T00:00:00Z"),
            ("user", r#"{"id":"u1"}"#),
            ("theme", "dark"),
        ]);

        session.clear();

        assert!(session.token().is_none());
        assert_eq!(store.get("token").unwrap(), None);
        assert_eq!(store.get("tokenExpiry").unwrap(), None);
        assert_eq!(store.get("user").unwrap(), None);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_cached_user_round_trip() {
        let (session, _) = session_with(&[]);
        assert!(session.cached_user().is_none());

        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "ada@example.com",
            "name": "Ada"
        }))
        .unwrap();
        session.cache_user(&user).unwrap();

        assert_eq!(session.cached_user().unwrap().email, "ada@example.com");
    }
}
