//! Outcome of a form flow: either go somewhere else or show a message.
//!
//! Every error leaving a flow is reduced to a message that is safe to show.
//! Recoverable errors keep their own wording; everything else is logged and
//! replaced by the flow's fallback text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// `303 See Other` to the given path.
    Redirect(String),
    /// Re-render with an error message.
    Failed { status: StatusCode, error: String },
}

#[derive(Serialize)]
struct FlowError<'a> {
    error: &'a str,
}

impl FlowOutcome {
    pub fn redirect(to: impl Into<String>) -> Self {
        FlowOutcome::Redirect(to.into())
    }

    /// Convert an error into a user-facing failure, logging internal detail.
    pub fn from_error(err: AppError, fallback: &str) -> Self {
        err.log();
        let error = if err.is_recoverable() {
            err.public_message()
                .unwrap_or_else(|| fallback.to_string())
        } else {
            fallback.to_string()
        };

        FlowOutcome::Failed {
            status: err.status(),
            error,
        }
    }
}

impl IntoResponse for FlowOutcome {
    fn into_response(self) -> Response {
        match self {
            FlowOutcome::Redirect(to) => Redirect::to(&to).into_response(),
            FlowOutcome::Failed { status, error } => {
                (status, Json(FlowError { error: &error })).into_response()
            }
        }
    }
}
