//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB,
    DEFAULT_HASH_PARALLELISM, DEFAULT_IMAGE_URL_PREFIX, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_IDLE_MINUTES, DEFAULT_STATIC_DIR, DEFAULT_UPLOAD_DIR, MAX_SESSION_IDLE_MINUTES,
};

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Redis backs the session store when set; otherwise sessions live in memory.
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub session_idle_minutes: i64,
    pub session_cookie_secure: bool,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub image_url_prefix: String,
    pub hash_cost: HashCost,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("session_idle_minutes", &self.session_idle_minutes)
            .field("session_cookie_secure", &self.session_cookie_secure)
            .field("upload_dir", &self.upload_dir)
            .field("static_dir", &self.static_dir)
            .field("image_url_prefix", &self.image_url_prefix)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: None,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            session_idle_minutes: DEFAULT_SESSION_IDLE_MINUTES,
            session_cookie_secure: false,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            image_url_prefix: DEFAULT_IMAGE_URL_PREFIX.to_string(),
            hash_cost: HashCost::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            // Non-positive lifetimes would expire sessions on issue.
            session_idle_minutes: parse_var("SESSION_IDLE_MINUTES")
                .filter(|minutes: &i64| *minutes > 0)
                .map(|minutes| minutes.min(MAX_SESSION_IDLE_MINUTES))
                .unwrap_or(defaults.session_idle_minutes),
            session_cookie_secure: parse_var("SESSION_COOKIE_SECURE")
                .unwrap_or(defaults.session_cookie_secure),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            // The prefix is mounted as a route, so it must be a non-root path.
            image_url_prefix: env::var("IMAGE_URL_PREFIX")
                .ok()
                .map(|prefix| prefix.trim_end_matches('/').to_string())
                .filter(|prefix| prefix.starts_with('/') && prefix.len() > 1)
                .unwrap_or(defaults.image_url_prefix),
            hash_cost: HashCost {
                memory_kib: parse_var("HASH_MEMORY_KIB").unwrap_or(defaults.hash_cost.memory_kib),
                iterations: parse_var("HASH_ITERATIONS").unwrap_or(defaults.hash_cost.iterations),
                parallelism: parse_var("HASH_PARALLELISM")
                    .unwrap_or(defaults.hash_cost.parallelism),
            },
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Session idle lifetime, kept within `1..=MAX_SESSION_IDLE_MINUTES`.
    pub fn session_idle(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_idle_minutes.clamp(1, MAX_SESSION_IDLE_MINUTES))
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
