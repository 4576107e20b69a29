//! HTTP request handlers.

pub mod auth_handler;
pub mod pages;
pub mod pet_handler;

pub use auth_handler::auth_routes;
pub use pages::page_routes;
pub use pet_handler::pet_routes;
