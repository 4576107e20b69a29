//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod pet_repository;
mod user_repository;

pub use pet_repository::{PetRepository, PetStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use pet_repository::MockPetRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
