//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{USERS_EMAIL_KEY, USERS_USERNAME_KEY};
use crate::domain::{NewUser, PasswordDigest, User};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Uniqueness of username and email is enforced by the
    /// store itself, so concurrent registrations cannot both succeed.
    async fn create(&self, user: NewUser, password_hash: PasswordDigest) -> AppResult<Uuid>;

    /// Case-sensitive exact match on username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: NewUser, password_hash: PasswordDigest) -> AppResult<Uuid> {
        user.validate()?;
        if password_hash.as_str().is_empty() {
            return Err(AppError::fields_required());
        }

        let id = Uuid::new_v4();
        let active_model = ActiveModel {
            id: Set(id),
            username: Set(user.username),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            email: Set(user.email),
            password_hash: Set(password_hash.into_string()),
            created_at: Set(chrono::Utc::now()),
        };

        active_model.insert(&self.db).await.map_err(map_insert_error)?;
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }
}

/// Translate unique-index violations into field-specific errors.
fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            classify_unique_violation(&detail).unwrap_or(AppError::Database(err))
        }
        _ => AppError::Database(err),
    }
}

fn classify_unique_violation(detail: &str) -> Option<AppError> {
    if detail.contains(USERS_USERNAME_KEY) {
        Some(AppError::DuplicateUsername)
    } else if detail.contains(USERS_EMAIL_KEY) {
        Some(AppError::DuplicateEmail)
    } else {
        None
    }
}
