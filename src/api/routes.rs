//! Application route configuration.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::handlers::{auth_routes, page_routes, pet_routes};
use super::middleware::session_gate;
use super::AppState;
use crate::config::{CSS_URL_PREFIX, MAX_UPLOAD_BYTES};

/// Create the application router with all routes configured.
///
/// The session gate wraps every route, static assets included; which paths
/// are public is decided by its allow-list, not by route order.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(page_routes())
        .merge(auth_routes())
        .merge(pet_routes())
        .nest_service(CSS_URL_PREFIX, ServeDir::new(&state.assets.css))
        .nest_service(state.image_urls.prefix(), ServeDir::new(&state.assets.img))
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<ServiceStatus>,
    sessions: ServiceStatus,
}

/// Service status. Failure detail goes to the log, never the response.
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(service: &str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => ServiceStatus { status: "healthy" },
            Err(e) => {
                tracing::warn!(service, error = %e, "Health check failed");
                ServiceStatus {
                    status: "unhealthy",
                }
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health check endpoint with database and session backend connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = async {
        match &state.database {
            Some(db) => Some(ServiceStatus::from_result("database", db.ping().await)),
            None => None,
        }
    };
    let sessions = async { ServiceStatus::from_result("sessions", state.sessions.ping().await) };
    let (database, sessions) = tokio::join!(database, sessions);

    let all_healthy =
        sessions.is_healthy() && database.as_ref().map_or(true, ServiceStatus::is_healthy);

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, sessions },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
