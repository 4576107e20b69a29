//! Page handlers.
//!
//! Templating lives outside this service; pages answer with the data a
//! template would render.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde::Serialize;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::HOME_PATH;
use crate::domain::{PetResponse, SessionUser, UserProfile};
use crate::errors::AppResult;

#[derive(Serialize)]
struct Welcome {
    status: &'static str,
    message: &'static str,
}

/// Placeholder body for form pages.
#[derive(Serialize)]
struct Page {
    page: &'static str,
}

/// Create page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/welcome", get(welcome))
        .route("/payment", get(|| page("payment")))
        .route("/home", get(home))
        .route("/profile", get(profile))
        .route("/editProfile", get(|| page("editProfile")))
        .route("/pet", get(pet))
}

/// Form page placeholder; the routers for each form mount their own.
pub(crate) async fn page(name: &'static str) -> impl IntoResponse {
    Json(Page { page: name })
}

async fn root() -> Redirect {
    Redirect::to(HOME_PATH)
}

async fn welcome() -> impl IntoResponse {
    Json(Welcome {
        status: "success",
        message: "Welcome!",
    })
}

/// Logged-in user's session identity.
async fn home(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<SessionUser> {
    Json(user)
}

async fn profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<UserProfile>> {
    let profile = state.services.users().profile(&user.username).await?;
    Ok(Json(profile))
}

/// First registered pet; falls back to the home page when there is none.
async fn pet(State(state): State<AppState>) -> Response {
    match state.services.pets().first_pet().await {
        Ok(Some(pet)) => Json(PetResponse::from_pet(pet, &state.image_urls)).into_response(),
        Ok(None) => Redirect::to(HOME_PATH).into_response(),
        Err(e) => {
            e.log();
            Redirect::to(HOME_PATH).into_response()
        }
    }
}
