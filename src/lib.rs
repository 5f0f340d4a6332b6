//! A small guestbook: visitors leave entries, administrators moderate them.
//!
//! Pages are rendered server-side with askama; htmx requests receive the
//! matching fragment instead of a full page.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;
