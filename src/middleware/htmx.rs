use axum::{
    extract::FromRequestParts,
    http::{HeaderName, request::Parts},
};
use std::convert::Infallible;

pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
pub const HX_RETARGET: HeaderName = HeaderName::from_static("hx-retarget");
pub const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");

/// Client event fired after a successful submission; the page script
/// clears the form when it sees it.
pub const ENTRY_ADDED_EVENT: &str = "entryAdded";

/// Whether the request was issued by htmx (`HX-Request: true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        Ok(HxRequest(is_htmx))
    }
}
