//! Defines routes for the guestbook pages, login and probes.
//!
//! ## Structure
//! - **Guestbook**
//!   - `GET    /`                     — redirect to `/guestbook`
//!   - `GET    /guestbook`            — list page
//!   - `POST   /guestbook`            — submit an entry
//!   - `DELETE /guestbook/{id}`       — delete an entry (admin)
//!   - `POST   /guestbook/edit/{id}`  — edit an entry (admin)
//!   - `POST   /guestbook/{id}/vote`  — up- or down-vote an entry
//!
//! - **Session**
//!   - `GET|POST /login`, `GET|POST /logout`
//!
//! - **Probes**
//!   - `GET /healthz`, `GET /readyz`

use crate::{
    handlers::{
        auth_handlers::{login, login_page, logout},
        guestbook_handlers::{
            create_entry, delete_entry, edit_entry, index, list_entries, vote_entry,
        },
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

/// Build the router for all guestbook routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // session
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
        // guestbook
        .route("/", get(index))
        .route("/guestbook", get(list_entries).post(create_entry))
        .route("/guestbook/{id}", delete(delete_entry))
        .route("/guestbook/edit/{id}", post(edit_entry))
        .route("/guestbook/{id}/vote", post(vote_entry))
}

/// The complete application with state applied and request tracing enabled.
pub fn app(state: AppState) -> Router {
    routes().layer(TraceLayer::new_for_http()).with_state(state)
}
