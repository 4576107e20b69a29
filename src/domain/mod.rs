//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod password;
pub mod pet;
pub mod session;
pub mod user;

pub use password::{CredentialHasher, PasswordDigest};
pub use pet::{ImageLocator, ImageUrls, NewPet, Pet, PetDraft, PetResponse};
pub use session::{SessionHandle, SessionRecord};
pub use user::{NewUser, SessionUser, User, UserProfile};
