//! Request extractors shared by the handlers: caller identity and htmx
//! request detection.

pub mod auth;
pub mod htmx;
