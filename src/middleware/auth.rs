//! Caller identity extraction.
//!
//! A request is authenticated either by HTTP Basic credentials or by the
//! `GUESTBOOK_SESSION` cookie issued at login. Basic credentials win when
//! both are present; wrong credentials are rejected outright rather than
//! silently downgraded to an anonymous caller.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::account::{Principal, Role},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "GUESTBOOK_SESSION";

/// The authenticated caller, if any.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some((username, password)) = parse_basic(&parts.headers) {
            return match state.auth.authenticate(&username, &password).await {
                Some(principal) => Ok(Caller(Some(principal))),
                None => {
                    warn!(username, "basic authentication failed");
                    Err(AppError::Unauthorized)
                }
            };
        }

        let principal = session_id(&parts.headers).and_then(|id| state.auth.session(&id));
        Ok(Caller(principal))
    }
}

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Principal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Caller(principal) = Caller::from_request_parts(parts, state).await?;
        require_role(principal, Role::Admin).map(RequireAdmin)
    }
}

/// Anonymous callers get 401, authenticated ones lacking `role` get 403.
pub fn require_role(principal: Option<Principal>, role: Role) -> Result<Principal, AppError> {
    match principal {
        None => Err(AppError::Unauthorized),
        Some(p) if p.has_role(role) => Ok(p),
        Some(p) => {
            warn!(username = %p.username, ?role, "caller lacks required role");
            Err(AppError::Forbidden(format!(
                "{} role required",
                match role {
                    Role::Admin => "administrator",
                    Role::User => "user",
                }
            )))
        }
    }
}

/// Session id from the request cookies, ignoring malformed values.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a freshly opened session that lives for `ttl`.
pub fn session_cookie(id: Uuid, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        id,
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn expired_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Decode `Authorization: Basic <base64(user:password)>`.
fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
