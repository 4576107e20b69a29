//! API layer - HTTP handlers and middleware
//!
//! This module contains all HTTP-related concerns:
//! - Request handlers
//! - Middleware (session gate)
//! - Custom extractors
//! - Route definitions

pub mod extractors;
pub mod flow;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use flow::FlowOutcome;
pub use routes::create_router;
pub use state::{AppState, AssetDirs};
