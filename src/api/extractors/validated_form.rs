//! Validated form extractor - urlencoded deserialization plus validation.

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    http::StatusCode,
    Form,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use validator::Validate;

use crate::api::FlowOutcome;

/// Urlencoded form that has passed its `validator` rules.
///
/// Rejections are reported the same way as any other flow failure, so a
/// handler never sees an invalid payload.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Deserialize, Validate)]
/// struct SignupForm {
///     #[serde(default)]
///     #[validate(length(min = 1, message = "All fields are required."))]
///     username: String,
/// }
///
/// async fn signup(ValidatedForm(form): ValidatedForm<SignupForm>) { /* ... */ }
/// ```
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = FlowOutcome;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| bad_request(e.body_text()))?;

        value
            .validate()
            .map_err(|e| bad_request(format_validation_errors(&e)))?;

        Ok(ValidatedForm(value))
    }
}

fn bad_request(error: String) -> FlowOutcome {
    FlowOutcome::Failed {
        status: StatusCode::BAD_REQUEST,
        error,
    }
}

/// Distinct rule messages, so several empty fields yield one sentence.
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}
