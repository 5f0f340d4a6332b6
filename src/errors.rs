use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    models::{entry::EntryId, form::FieldErrors},
    services::entry_store::StoreError,
    views::{ErrorPage, Viewer},
};

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The addressed entry does not exist.
    #[error("entry {0} not found")]
    NotFound(EntryId),

    /// Malformed or missing input.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// No authenticated caller on a guarded route.
    #[error("authentication required")]
    Unauthorized,

    /// Authenticated caller without the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "An internal error occurred".to_string(),
            AppError::Unauthorized => "Please log in to continue.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(msg) => tracing::error!(error = %msg, "request failed"),
            other => tracing::debug!(error = %other, status = status.as_u16(), "request rejected"),
        }

        let message = self.public_message();
        let viewer = Viewer::default();
        let page = ErrorPage {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message: &message,
            viewer: &viewer,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to render error page");
                (status, message).into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
