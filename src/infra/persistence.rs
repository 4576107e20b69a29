//! Repository access point.
//!
//! Services depend on the [`Repositories`] trait so tests can hand them
//! in-memory or mocked stores instead of a live database.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{PetRepository, PetStore, UserRepository, UserStore};

/// Centralized access to all repositories.
pub trait Repositories: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get pet repository
    fn pets(&self) -> Arc<dyn PetRepository>;
}

/// SeaORM-backed repositories sharing one connection pool.
pub struct Persistence {
    user_repo: Arc<UserStore>,
    pet_repo: Arc<PetStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            pet_repo: Arc::new(PetStore::new(db)),
        }
    }
}

impl Repositories for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn pets(&self) -> Arc<dyn PetRepository> {
        self.pet_repo.clone()
    }
}
