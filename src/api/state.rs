//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::middleware::AllowList;
use crate::config::Config;
use crate::domain::ImageUrls;
use crate::infra::Database;
use crate::services::{Services, SessionManager};

/// Directories served as static assets.
#[derive(Debug, Clone)]
pub struct AssetDirs {
    /// Stylesheets, served under `/css`
    pub css: PathBuf,
    /// Uploaded pet images, served under the image URL prefix
    pub img: PathBuf,
}

impl AssetDirs {
    pub fn from_config(config: &Config) -> Self {
        Self {
            css: config.static_dir.clone(),
            img: config.upload_dir.clone(),
        }
    }
}

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Application services
    pub services: Services,
    /// Session lifecycle
    pub sessions: SessionManager,
    /// Maps stored image locators to public URLs
    pub image_urls: ImageUrls,
    /// Paths the session gate lets through, derived from `image_urls`
    pub allow_list: Arc<AllowList>,
    /// Static asset directories
    pub assets: AssetDirs,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Database handle, checked by `/health` when present
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create new application state with manually injected services.
    pub fn new(
        services: Services,
        sessions: SessionManager,
        image_urls: ImageUrls,
        assets: AssetDirs,
    ) -> Self {
        let allow_list = Arc::new(AllowList::public(&image_urls));
        Self {
            services,
            sessions,
            image_urls,
            allow_list,
            assets,
            cookie_secure: false,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Arc<Database>) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}
