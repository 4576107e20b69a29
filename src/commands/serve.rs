//! Serve command - Starts the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use mockable::DefaultClock;

use crate::api::{create_router, AppState, AssetDirs};
use crate::cli::args::ServeArgs;
use crate::config::{Config, SESSION_SWEEP_INTERVAL_SECONDS};
use crate::domain::{CredentialHasher, ImageUrls};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    Cache, Database, DiskIntake, MemorySessionStore, Persistence, RedisSessionStore, SessionStore,
};
use crate::services::{Services, SessionManager};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Initialize database (applies pending migrations)
    let db = Arc::new(Database::connect(&config.database_url).await?);

    let intake = DiskIntake::new(&config.upload_dir);
    intake.ensure_root().await?;
    tracing::info!(upload_dir = %intake.root().display(), "Upload directory ready");

    let sessions = SessionManager::new(
        session_store(&config).await?,
        Arc::new(DefaultClock),
        config.session_idle(),
    );
    spawn_session_sweeper(sessions.clone());

    let services = Services::from_repositories(
        Arc::new(Persistence::new(db.get_connection())),
        CredentialHasher::new(config.hash_cost)?,
        Arc::new(intake),
    );

    let app_state = AppState::new(
        services,
        sessions,
        ImageUrls::new(config.image_url_prefix.clone()),
        AssetDirs::from_config(&config),
    )
    .with_database(db)
    .with_secure_cookies(config.session_cookie_secure);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise process memory.
async fn session_store(config: &Config) -> AppResult<Arc<dyn SessionStore>> {
    match &config.redis_url {
        Some(url) => {
            let cache = Cache::connect(url)
                .await
                .map_err(|e| AppError::cache(format!("Redis connection failed: {}", e)))?;
            tracing::info!("Using Redis session store");
            Ok(Arc::new(RedisSessionStore::new(cache)))
        }
        None => {
            tracing::info!("Using in-memory session store");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}

fn spawn_session_sweeper(sessions: SessionManager) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECONDS));
        loop {
            interval.tick().await;
            if let Err(e) = sessions.sweep().await {
                e.log();
            }
        }
    });
}
