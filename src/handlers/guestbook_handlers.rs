//! HTTP handlers for the guestbook pages.
//!
//! Every mutating handler has two response shapes: plain browser requests get
//! a 303 redirect back to the list, htmx requests get the fragment to swap in.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    errors::AppError,
    middleware::{
        auth::{Caller, RequireAdmin},
        htmx::{ENTRY_ADDED_EVENT, HX_RESWAP, HX_RETARGET, HX_TRIGGER, HxRequest},
    },
    models::{
        entry::EntryId,
        form::{EditForm, GuestbookForm, VoteForm},
    },
    services::guestbook_service::Change,
    state::AppState,
    views::{
        EntriesFragment, EntryFragment, FormFragment, FormView, GuestbookPage, Viewer, render,
    },
};

const LIST_PATH: &str = "/guestbook";

/// `GET /`
pub async fn index() -> Redirect {
    Redirect::to(LIST_PATH)
}

/// `GET /guestbook` renders all entries and an empty form.
pub async fn list_entries(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Response, AppError> {
    let entries = state.guestbook.list().await?;
    let viewer = Viewer::new(caller.as_ref());
    let form = FormView::default();

    let page = GuestbookPage {
        entries: &entries,
        form: &form,
        viewer: &viewer,
    };
    Ok(render(&page)?.into_response())
}

/// `POST /guestbook`
///
/// A rejected submission is not an error for the visitor: the form comes back
/// with their input and the messages, and nothing is stored.
pub async fn create_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    HxRequest(hx): HxRequest,
    Form(form): Form<GuestbookForm>,
) -> Result<Response, AppError> {
    let viewer = Viewer::new(caller.as_ref());

    match state.guestbook.create(&form).await {
        Ok(change) => present(change, hx, &viewer),
        Err(AppError::Validation(errors)) => {
            tracing::debug!(%errors, "submission rejected");
            let view = FormView::rejected(&form, errors);
            if hx {
                let html = render(&FormFragment { form: &view })?;
                Ok((
                    [(HX_RETARGET, "#entry-form"), (HX_RESWAP, "outerHTML")],
                    html,
                )
                    .into_response())
            } else {
                let entries = state.guestbook.list().await?;
                let page = GuestbookPage {
                    entries: &entries,
                    form: &view,
                    viewer: &viewer,
                };
                Ok(render(&page)?.into_response())
            }
        }
        Err(err) => Err(err),
    }
}

/// `DELETE /guestbook/{id}`
pub async fn delete_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    HxRequest(hx): HxRequest,
    Path(id): Path<EntryId>,
) -> Result<Response, AppError> {
    let change = state.guestbook.delete(id).await?;
    present(change, hx, &Viewer::new(Some(&admin)))
}

/// `POST /guestbook/edit/{id}`
pub async fn edit_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    HxRequest(hx): HxRequest,
    Path(id): Path<EntryId>,
    Form(form): Form<EditForm>,
) -> Result<Response, AppError> {
    let change = state.guestbook.edit(id, &form).await?;
    present(change, hx, &Viewer::new(Some(&admin)))
}

/// `POST /guestbook/{id}/vote`
pub async fn vote_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    HxRequest(hx): HxRequest,
    Path(id): Path<EntryId>,
    Form(form): Form<VoteForm>,
) -> Result<Response, AppError> {
    let change = state.guestbook.vote(id, &form).await?;
    present(change, hx, &Viewer::new(caller.as_ref()))
}

fn present(change: Change, hx: bool, viewer: &Viewer) -> Result<Response, AppError> {
    if !hx {
        return Ok(Redirect::to(LIST_PATH).into_response());
    }

    let response = match change {
        Change::Created { entry, index } => {
            let html = render(&EntryFragment {
                entry: &entry,
                index,
                viewer,
            })?;
            ([(HX_TRIGGER, ENTRY_ADDED_EVENT)], html).into_response()
        }
        Change::Updated { entry, index } => render(&EntryFragment {
            entry: &entry,
            index,
            viewer,
        })?
        .into_response(),
        Change::Deleted { remaining, .. } => render(&EntriesFragment {
            entries: &remaining,
            viewer,
        })?
        .into_response(),
    };
    Ok(response)
}
