//! Core data models of the guestbook.
//!
//! Entries map to the `entries` table via `sqlx::FromRow`; the form types are
//! bound from urlencoded request bodies and validated with `validator`.

pub mod account;
pub mod entry;
pub mod form;
pub mod vote;
