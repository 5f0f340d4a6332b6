use crate::services::{auth_service::AuthService, guestbook_service::GuestbookService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub guestbook: GuestbookService,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(guestbook: GuestbookService, auth: AuthService) -> Self {
        Self { guestbook, auth }
    }
}
