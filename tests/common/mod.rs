#![allow(dead_code)]

use argon2::{
    Algorithm, Argon2, Params, PasswordHasher, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use guestbook::{
    db,
    models::account::Role,
    routes,
    services::{
        auth_service::{Account, AuthService},
        entry_store::{EntryStore, SqliteEntryStore},
        guestbook_service::GuestbookService,
    },
    state::AppState,
};

pub const ADMIN: (&str, &str) = ("root", "s3cret");
pub const USER: (&str, &str) = ("ann", "hello");

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub fn store(&self) -> &dyn EntryStore {
        self.state.guestbook.store()
    }

    pub async fn count(&self) -> i64 {
        self.store().count().await.unwrap()
    }
}

/// Argon2 with minimal cost so logins stay fast under test.
fn cheap_hash(password: &str) -> String {
    let params = Params::new(8, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// App on a fresh, empty in-memory database with one admin and one user.
pub async fn spawn_app() -> TestApp {
    let pool = db::connect("sqlite::memory:").await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let store = Arc::new(SqliteEntryStore::new(Arc::new(pool)));

    let auth = AuthService::new([
        Account::new(ADMIN.0, cheap_hash(ADMIN.1), [Role::Admin, Role::User]),
        Account::new(USER.0, cheap_hash(USER.1), [Role::User]),
    ]);
    let state = AppState::new(GuestbookService::new(store), auth);

    TestApp {
        router: routes::app(state.clone()),
        state,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_basic(mut req: Request<Body>, (username, password): (&str, &str)) -> Request<Body> {
    let token = STANDARD.encode(format!("{}:{}", username, password));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Basic {}", token).parse().unwrap(),
    );
    req
}

pub fn with_htmx(mut req: Request<Body>) -> Request<Body> {
    req.headers_mut()
        .insert("hx-request", "true".parse().unwrap());
    req
}

pub fn with_cookie(mut req: Request<Body>, cookie: &str) -> Request<Body> {
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    req
}

pub fn header_str<'a>(resp: &'a Response<Body>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
