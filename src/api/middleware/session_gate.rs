//! Session gate - keeps anonymous browsers out of protected pages.
//!
//! Public paths are listed explicitly; everything else needs a logged-in
//! session. An anonymous navigation to a protected page is remembered and
//! answered with a redirect to the login page.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::api::AppState;
use crate::config::{CSS_URL_PREFIX, LOGIN_PATH, SESSION_COOKIE_NAME};
use crate::domain::{ImageUrls, SessionHandle, SessionUser};
use crate::errors::AppError;

/// Logged-in user, inserted into request extensions by [`session_gate`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub SessionUser);

/// Pages every visitor may fetch.
const PUBLIC_PAGES: &[&str] = &[
    "/welcome",
    "/login",
    "/register",
    "/register2",
    "/payment",
    "/health",
];

/// Protected pages a visitor is sent back to after logging in.
const RESUMABLE_PAGES: &[&str] = &["/", "/home", "/profile", "/pet", "/editProfile"];

/// Paths reachable without a session.
#[derive(Debug, Clone)]
pub struct AllowList {
    exact: &'static [&'static str],
    prefixes: Vec<String>,
}

impl AllowList {
    /// Public pages plus the stylesheet and uploaded image mounts.
    pub fn public(images: &ImageUrls) -> Self {
        Self {
            exact: PUBLIC_PAGES,
            prefixes: vec![
                format!("{}/", CSS_URL_PREFIX),
                format!("{}/", images.prefix()),
            ],
        }
    }

    pub fn permits(&self, path: &str) -> bool {
        self.exact.contains(&path) || self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Whether an anonymous request should be resumed after login.
///
/// Only page navigations count, so stray fetches such as `/favicon.ico`
/// never replace the page the visitor asked for.
pub fn is_resumable(method: &Method, path: &str) -> bool {
    *method == Method::GET && RESUMABLE_PAGES.contains(&path)
}

/// Session gate middleware.
///
/// Resolves the session cookie for protected paths and injects
/// [`CurrentUser`]. Anonymous requests are redirected to the login page;
/// page navigations have their target captured first.
pub async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.allow_list.permits(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let handle = session_handle(&jar);
    if let Some(handle) = &handle {
        if let Some(user) = state.sessions.current_user(handle).await? {
            request.extensions_mut().insert(CurrentUser(user));
            return Ok(next.run(request).await);
        }
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| request.uri().path());
    tracing::debug!(
        method = %request.method(),
        path = %target,
        "Anonymous request redirected to login"
    );

    if !is_resumable(request.method(), request.uri().path()) {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }

    let handle = state
        .sessions
        .capture_redirect(handle.as_ref(), target)
        .await?;
    let jar = jar.add(session_cookie(&handle, state.cookie_secure));

    Ok((jar, Redirect::to(LOGIN_PATH)).into_response())
}

/// Session handle carried by the request, if any.
pub fn session_handle(jar: &CookieJar) -> Option<SessionHandle> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value())
        .filter(|token| !token.is_empty())
        .map(SessionHandle::from_token)
}

/// Cookie handing `handle` to the browser.
pub fn session_cookie(handle: &SessionHandle, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, handle.as_str().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Cookie matching [`session_cookie`], for removal.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
}
