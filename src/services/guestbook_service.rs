//! Request orchestration on top of an [`EntryStore`].
//!
//! Each operation validates its input, performs a single logical change
//! against the store and reports it as a [`Change`]. Deciding between a full
//! page and an htmx fragment is left to the handlers.

use std::sync::Arc;
use tracing::info;

use crate::{
    errors::AppError,
    models::{
        entry::{EntryId, GuestbookEntry},
        form::{EditForm, FieldErrors, GuestbookForm, VoteForm},
        vote::Vote,
    },
    services::entry_store::EntryStore,
};

/// Marker appended to the author name of edited entries.
pub const EDIT_MARKER: &str = " [EDIT]";

/// The outcome of a mutating operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A new entry, with its 1-based position in the list.
    Created { entry: GuestbookEntry, index: usize },
    /// An entry changed in place.
    Updated { entry: GuestbookEntry, index: usize },
    /// An entry was removed; `remaining` is the list afterwards.
    Deleted {
        id: EntryId,
        remaining: Vec<GuestbookEntry>,
    },
}

#[derive(Clone)]
pub struct GuestbookService {
    store: Arc<dyn EntryStore>,
}

impl GuestbookService {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn EntryStore {
        self.store.as_ref()
    }

    pub async fn list(&self) -> Result<Vec<GuestbookEntry>, AppError> {
        Ok(self.store.find_all().await?)
    }

    /// Look up an entry, treating absence as [`AppError::NotFound`].
    pub async fn find(&self, id: EntryId) -> Result<GuestbookEntry, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound(id))
    }

    /// Validate `form` and persist it as a new entry.
    ///
    /// Returns [`AppError::Validation`] without touching the store when the
    /// form is rejected.
    pub async fn create(&self, form: &GuestbookForm) -> Result<Change, AppError> {
        form.check().map_err(AppError::Validation)?;

        let entry = self.store.save(&form.to_new_entry()).await?;
        let count = self.store.count().await?;
        info!(id = ?entry.id(), name = entry.name(), "entry created");

        Ok(Change::Created {
            entry,
            index: usize::try_from(count).unwrap_or_default(),
        })
    }

    pub async fn delete(&self, id: EntryId) -> Result<Change, AppError> {
        let entry = self.find(id).await?;
        self.store.delete(&entry).await?;
        info!(id, "entry deleted");

        let remaining = self.list().await?;
        Ok(Change::Deleted { id, remaining })
    }

    /// Mark the author name as edited and replace the text.
    ///
    /// An unknown id is reported before the form is looked at.
    pub async fn edit(&self, id: EntryId, form: &EditForm) -> Result<Change, AppError> {
        self.find(id).await?;
        form.check().map_err(AppError::Validation)?;

        let entry = self.store.mark_edited(id, EDIT_MARKER, &form.text).await?;
        info!(id, "entry edited");
        self.updated(entry).await
    }

    pub async fn vote(&self, id: EntryId, form: &VoteForm) -> Result<Change, AppError> {
        let vote: Vote = form
            .vote
            .parse()
            .map_err(|err| AppError::Validation(FieldErrors::single("vote", format!("{}", err))))?;

        let entry = self.store.apply_vote(id, vote.rating()).await?;
        info!(id, %vote, rating = entry.rating(), "vote recorded");
        self.updated(entry).await
    }

    async fn updated(&self, entry: GuestbookEntry) -> Result<Change, AppError> {
        let index = self
            .list()
            .await?
            .iter()
            .position(|e| e.id() == entry.id())
            .map_or(0, |pos| pos + 1);
        Ok(Change::Updated { entry, index })
    }
}
