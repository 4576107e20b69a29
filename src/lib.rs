//! Petpals - user accounts, pet profiles and session-gated pages.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core entities (users, pets, sessions, credentials)
//! - **services**: Registration, login, pet intake and session lifecycle
//! - **infra**: Database, file intake and session storage
//! - **api**: HTTP handlers, session gate and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{Pet, SessionUser, User};
pub use errors::{AppError, AppResult};
