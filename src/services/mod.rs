//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) so the
//! HTTP layer and tests can swap implementations.

mod auth_service;
pub mod container;
mod pet_service;
pub mod session;
mod user_service;

// Service Container
pub use container::Services;

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator};
pub use pet_service::{ImageUpload, PetRegistrar, PetService};
pub use session::SessionManager;
pub use user_service::{UserManager, UserService};
