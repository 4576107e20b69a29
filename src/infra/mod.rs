//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Durable storage for uploaded images
//! - Session storage (in-memory or Redis)

pub mod cache;
pub mod db;
pub mod file_intake;
pub mod persistence;
pub mod repositories;
pub mod session_store;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use file_intake::{DiskIntake, FileIntake};
pub use persistence::{Persistence, Repositories};
pub use repositories::{PetRepository, PetStore, UserRepository, UserStore};
pub use session_store::{MemorySessionStore, RedisSessionStore, SessionStore};

#[cfg(test)]
pub use file_intake::MockFileIntake;
#[cfg(test)]
pub use repositories::{MockPetRepository, MockUserRepository};
