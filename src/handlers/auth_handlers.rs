//! Form login and logout.

use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    errors::AppError,
    middleware::auth::{Caller, expired_session_cookie, session_cookie, session_id},
    models::form::LoginForm,
    state::AppState,
    views::{LoginPage, Viewer, render},
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Present (usually empty) after a failed attempt.
    pub error: Option<String>,
}

/// `GET /login`
pub async fn login_page(
    Caller(caller): Caller,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let viewer = Viewer::new(caller.as_ref());
    let page = LoginPage {
        error: query.error.is_some(),
        viewer: &viewer,
    };
    Ok(render(&page)?.into_response())
}

/// `POST /login`
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth.authenticate(&form.username, &form.password).await {
        Some(principal) => {
            info!(username = %principal.username, "login succeeded");
            let id = state.auth.open_session(principal);
            (
                [(SET_COOKIE, session_cookie(id, state.auth.session_ttl()))],
                Redirect::to("/guestbook"),
            )
                .into_response()
        }
        None => {
            warn!(username = %form.username, "login failed");
            Redirect::to("/login?error").into_response()
        }
    }
}

/// `GET|POST /logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.auth.close_session(&id);
    }
    (
        [(SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
