//! User API client methods

use tracing::warn;

use urlencoding::encode;

use super::{ClientError, RequestConfig, SessionClient};
use crate::types::{ListBody, UpdateUserRequest, User, UserQuery};

impl SessionClient {
    /// Get the current user and refresh the cached profile
    pub async fn get_me(&self) -> Result<User, ClientError> {
        let user: User = self.request_as(RequestConfig::get("/users/me")).await?;
        self.remember_user(&user);
        Ok(user)
    }

    /// Update the current user's profile
    pub async fn update_me(&self, request: &UpdateUserRequest) -> Result<User, ClientError> {
        let config = RequestConfig::put("/users/me").json(request)?;
        let user: User = self.request_as(config).await?;
        self.remember_user(&user);
        Ok(user)
    }

    /// List users (administrators only)
    pub async fn list_users(&self, query: &UserQuery) -> Result<Vec<User>, ClientError> {
        let config = RequestConfig::get("/users").query(query)?;
        let users: ListBody<User> = self.request_as(config).await?;
        Ok(users.into_vec())
    }

    /// Get a user by id
    pub async fn get_user(&self, id: &str) -> Result<User, ClientError> {
        self.request_as(RequestConfig::get(format!("/users/{}", encode(id))))
            .await
    }

    fn remember_user(&self, user: &User) {
        if let Err(e) = self.session().cache_user(user) {
            warn!(error = %e, "Failed to cache user profile");
        }
    }
}
