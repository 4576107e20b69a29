//! User service - read side of the account data.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::UserProfile;
use crate::errors::{AppResult, OptionExt};
use crate::infra::Repositories;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Profile of the account with this exact username.
    async fn profile(&self, username: &str) -> AppResult<UserProfile>;
}

/// Concrete implementation of UserService over the repositories.
pub struct UserManager<R: Repositories> {
    repos: Arc<R>,
}

impl<R: Repositories> UserManager<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl<R: Repositories> UserService for UserManager<R> {
    async fn profile(&self, username: &str) -> AppResult<UserProfile> {
        self.repos
            .users()
            .find_by_username(username)
            .await?
            .ok_or_not_found()
            .map(UserProfile::from)
    }
}
