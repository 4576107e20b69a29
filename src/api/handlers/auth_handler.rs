//! Account handlers: registration, login and logout.

use axum::{
    extract::State,
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedForm;
use crate::api::handlers::pages::page;
use crate::api::middleware::{expired_session_cookie, session_cookie, session_handle};
use crate::api::{AppState, FlowOutcome};
use crate::config::{HOME_PATH, LOGIN_PATH, MSG_LOGIN_ERROR, MSG_REGISTRATION_FAILED};
use crate::domain::{NewUser, SessionHandle};
use crate::errors::AppResult;

/// Registration form
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(rename = "first-name", default)]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub first_name: String,
    #[serde(rename = "last-name", default)]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub password: String,
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Create account routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(|| page("register")).post(register))
        .route("/login", get(|| page("login")).post(login))
        .route("/logout", get(logout))
}

/// Register a new account, then send the browser to the login page.
pub async fn register(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<RegisterForm>,
) -> FlowOutcome {
    let user = NewUser {
        username: form.username,
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
    };

    match state.services.auth().register(user, form.password).await {
        Ok(_) => FlowOutcome::redirect(LOGIN_PATH),
        Err(e) => FlowOutcome::from_error(e, MSG_REGISTRATION_FAILED),
    }
}

/// Log in and resume the page that required it, or go home.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> (CookieJar, FlowOutcome) {
    let prior = session_handle(&jar);

    match start_session(&state, prior.as_ref(), form).await {
        Ok((handle, target)) => {
            let jar = jar.add(session_cookie(&handle, state.cookie_secure));
            (jar, FlowOutcome::redirect(target))
        }
        Err(e) => (jar, FlowOutcome::from_error(e, MSG_LOGIN_ERROR)),
    }
}

async fn start_session(
    state: &AppState,
    prior: Option<&SessionHandle>,
    form: LoginForm,
) -> AppResult<(SessionHandle, String)> {
    let user = state
        .services
        .auth()
        .authenticate(form.username, form.password)
        .await?;

    let handle = state.sessions.issue(prior, user).await?;
    let target = state
        .sessions
        .consume_redirect(&handle)
        .await?
        .unwrap_or_else(|| HOME_PATH.to_string());

    Ok((handle, target))
}

/// End the session and clear its cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, FlowOutcome) {
    if let Some(handle) = session_handle(&jar) {
        if let Err(e) = state.sessions.invalidate(&handle).await {
            e.log();
        }
    }

    (jar.remove(expired_session_cookie()), FlowOutcome::redirect(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MSG_ALL_FIELDS_REQUIRED;

    #[test]
    fn test_register_form_requires_every_field() {
        let form = RegisterForm {
            first_name: "Alice".to_string(),
            last_name: String::new(),
            email: "a@x.io".to_string(),
            username: "alice".to_string(),
            password: "s3cret".to_string(),
        };

        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("last_name"));
        let message = errors.field_errors()["last_name"][0].message.clone();
        assert_eq!(message.as_deref(), Some(MSG_ALL_FIELDS_REQUIRED));
    }
}
