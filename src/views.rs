//! Askama page and fragment templates.
//!
//! Full pages extend `layout.html`; fragments are the same partials the pages
//! include, rendered on their own for htmx swaps.

use askama::Template;
use axum::response::Html;

use crate::{
    errors::AppError,
    models::{
        account::Principal,
        entry::GuestbookEntry,
        form::{FieldErrors, GuestbookForm},
    },
};

/// What the templates need to know about the caller.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub username: Option<String>,
    pub is_admin: bool,
}

impl Viewer {
    pub fn new(principal: Option<&Principal>) -> Self {
        Self {
            username: principal.map(|p| p.username.clone()),
            is_admin: principal.is_some_and(Principal::is_admin),
        }
    }
}

/// Submission form state: the values to prefill and any messages to show.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub name: String,
    pub text: String,
    pub image_url: String,
    pub errors: FieldErrors,
}

impl FormView {
    /// Echo a rejected submission back with its field errors.
    pub fn rejected(form: &GuestbookForm, errors: FieldErrors) -> Self {
        Self {
            name: form.name.clone(),
            text: form.text.clone(),
            image_url: form.image_url.clone().unwrap_or_default(),
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "guestbook.html")]
pub struct GuestbookPage<'a> {
    pub entries: &'a [GuestbookEntry],
    pub form: &'a FormView,
    pub viewer: &'a Viewer,
}

#[derive(Template)]
#[template(path = "entry.html")]
pub struct EntryFragment<'a> {
    pub entry: &'a GuestbookEntry,
    /// 1-based position in the list.
    pub index: usize,
    pub viewer: &'a Viewer,
}

#[derive(Template)]
#[template(path = "entries.html")]
pub struct EntriesFragment<'a> {
    pub entries: &'a [GuestbookEntry],
    pub viewer: &'a Viewer,
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormFragment<'a> {
    pub form: &'a FormView,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    pub error: bool,
    pub viewer: &'a Viewer,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub status: u16,
    pub reason: &'a str,
    pub message: &'a str,
    pub viewer: &'a Viewer,
}

/// Render `template` into an HTML response body.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}
