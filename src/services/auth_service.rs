//! Authentication service - registration and credential checks.
//!
//! Argon2 is deliberately slow, so hashing and verification run on the
//! blocking pool instead of an async worker.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CredentialHasher, NewUser, PasswordDigest, SessionUser};
use crate::errors::{AppError, AppResult};
use crate::infra::Repositories;

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account. The password is hashed before it reaches storage.
    async fn register(&self, user: NewUser, password: String) -> AppResult<Uuid>;

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// [`AppError::AuthenticationFailure`].
    async fn authenticate(&self, username: String, password: String) -> AppResult<SessionUser>;
}

/// Concrete implementation of AuthService over the repositories.
pub struct Authenticator<R: Repositories> {
    repos: Arc<R>,
    hasher: CredentialHasher,
}

impl<R: Repositories> Authenticator<R> {
    pub fn new(repos: Arc<R>, hasher: CredentialHasher) -> Self {
        Self { repos, hasher }
    }

    async fn hash(&self, password: String) -> AppResult<PasswordDigest> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: String, digest: Option<PasswordDigest>) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => {
                hasher.verify_dummy(&password);
                Ok(false)
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))?
    }
}

#[async_trait]
impl<R: Repositories> AuthService for Authenticator<R> {
    async fn register(&self, user: NewUser, password: String) -> AppResult<Uuid> {
        user.validate()?;
        if password.is_empty() {
            return Err(AppError::fields_required());
        }

        let digest = self.hash(password).await?;
        let username = user.username.clone();
        let id = self.repos.users().create(user, digest).await?;

        tracing::info!(user_id = %id, username = %username, "User registered");
        Ok(id)
    }

    async fn authenticate(&self, username: String, password: String) -> AppResult<SessionUser> {
        let user = self.repos.users().find_by_username(&username).await?;
        let digest = user
            .as_ref()
            .map(|u| PasswordDigest::from_stored(u.password_hash.clone()));

        let valid = self.verify(password, digest).await?;

        match user {
            Some(user) if valid => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(user.session_user())
            }
            _ => {
                tracing::debug!(username = %username, "Login rejected");
                Err(AppError::AuthenticationFailure)
            }
        }
    }
}
