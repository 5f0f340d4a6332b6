pub mod auth_service;
pub mod entry_store;
pub mod guestbook_service;
pub mod seed;
