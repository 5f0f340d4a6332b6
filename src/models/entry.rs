//! Represents a single guestbook entry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::vote::Vote;

/// Store-assigned identifier of a [`GuestbookEntry`].
pub type EntryId = i64;

/// A guestbook entry as written by a visitor.
///
/// The identifier stays `None` until the entry has been saved by an
/// [`EntryStore`](crate::services::entry_store::EntryStore), and the creation
/// timestamp is fixed when the value is constructed. Neither has a setter.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq)]
pub struct GuestbookEntry {
    id: Option<EntryId>,
    name: String,
    text: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    rating: i32,
}

impl GuestbookEntry {
    /// Create a transient entry stamped with the current time and a zero rating.
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            text: text.into(),
            image_url,
            created_at: Utc::now(),
            rating: 0,
        }
    }

    pub fn id(&self) -> Option<EntryId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Apply the rating delta of `vote`, saturating at the `i32` bounds.
    pub fn vote(&mut self, vote: Vote) {
        self.rating = self.rating.saturating_add(vote.rating());
    }

    /// Human-readable creation time used by the templates.
    pub fn created_display(&self) -> String {
        self.created_at.format("%d.%m.%Y %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_transient_with_zero_rating() {
        let entry = GuestbookEntry::new("Ann", "hi", None);
        assert_eq!(entry.id(), None);
        assert_eq!(entry.rating(), 0);
        assert_eq!(entry.image_url(), None);
        assert!(entry.created_at() <= Utc::now());
    }

    #[test]
    fn votes_accumulate_into_rating() {
        let mut entry = GuestbookEntry::new("Ann", "hi", None);
        entry.vote(Vote::Up);
        entry.vote(Vote::Up);
        entry.vote(Vote::Down);
        assert_eq!(entry.rating(), 1);
    }

    #[test]
    fn rating_saturates_instead_of_overflowing() {
        let mut entry = GuestbookEntry::new("Ann", "hi", None);
        entry.rating = i32::MAX;
        entry.vote(Vote::Up);
        assert_eq!(entry.rating(), i32::MAX);

        entry.rating = i32::MIN;
        entry.vote(Vote::Down);
        assert_eq!(entry.rating(), i32::MIN);
    }

    #[test]
    fn edits_keep_creation_time() {
        let mut entry = GuestbookEntry::new("Ann", "hi", Some("https://example.org/a.png".into()));
        let created = entry.created_at();
        entry.set_name("Ann [EDIT]");
        entry.set_text("bye");
        assert_eq!(entry.created_at(), created);
        assert_eq!(entry.name(), "Ann [EDIT]");
        assert_eq!(entry.text(), "bye");
        assert_eq!(entry.image_url(), Some("https://example.org/a.png"));
    }
}
