//! Accounts, Argon2 password checks and in-memory login sessions.
//!
//! Accounts are fixed at startup from configuration. Sessions are keyed by a
//! random UUID carried in the `GUESTBOOK_SESSION` cookie and are dropped on
//! logout, once they outlive the session TTL, or on process restart.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use dashmap::DashMap;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    models::account::{Principal, Role},
};

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC string, which embeds algorithm parameters and salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// The parameters come from the hash itself, so cheaper test hashes verify fast.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// A login-capable account.
#[derive(Clone, Debug)]
pub struct Account {
    pub username: String,
    password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl Account {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Build the administrator account described by `cfg`.
    ///
    /// Prefers a configured PHC hash, then a plaintext password hashed here.
    /// With neither, a random password is generated and logged once.
    pub fn admin_from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let hash = match (&cfg.admin_password_hash, &cfg.admin_password) {
            (Some(hash), _) => {
                PasswordHash::new(hash)
                    .map_err(|e| anyhow::anyhow!("invalid admin password hash: {}", e))?;
                hash.clone()
            }
            (None, Some(password)) => hash_password(password)
                .map_err(|e| anyhow::anyhow!("hashing admin password: {}", e))?,
            (None, None) => {
                let generated = Uuid::new_v4().simple().to_string();
                warn!(
                    username = %cfg.admin_username,
                    "No admin password configured. Using generated password: {}",
                    generated
                );
                hash_password(&generated)
                    .map_err(|e| anyhow::anyhow!("hashing generated admin password: {}", e))?
            }
        };

        Ok(Self::new(
            cfg.admin_username.clone(),
            hash,
            [Role::Admin, Role::User],
        ))
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.roles.iter().copied())
    }
}

/// Session lifetime used unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

#[derive(Clone, Debug)]
struct Session {
    principal: Principal,
    issued_at: Instant,
}

impl Session {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() >= ttl
    }
}

/// Authentication provider shared by all handlers.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<HashMap<String, Account>>,
    sessions: Arc<DashMap<Uuid, Session>>,
    session_ttl: Duration,
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new([])
    }
}

impl AuthService {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.username.clone(), account))
            .collect();
        Self {
            accounts: Arc::new(accounts),
            sessions: Arc::new(DashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Check credentials, returning the caller identity on success.
    ///
    /// Argon2 is CPU-bound, so verification runs on the blocking pool.
    pub async fn authenticate(&self, username: &str, password: &str) -> Option<Principal> {
        let account = self.accounts.get(username)?.clone();
        let password = password.to_string();
        let hash = account.password_hash.clone();

        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await;
        match verified {
            Ok(Ok(true)) => Some(account.principal()),
            Ok(Ok(false)) => None,
            Ok(Err(err)) => {
                warn!(username, error = %err, "stored password hash is unusable");
                None
            }
            Err(err) => {
                warn!(username, error = %err, "password verification task failed");
                None
            }
        }
    }

    /// Start a session for `principal` and return its identifier.
    ///
    /// Expired sessions are swept first, so the table only holds sessions
    /// issued within the last TTL.
    pub fn open_session(&self, principal: Principal) -> Uuid {
        self.purge_expired();

        let id = Uuid::new_v4();
        info!(username = %principal.username, "session opened");
        self.sessions.insert(
            id,
            Session {
                principal,
                issued_at: Instant::now(),
            },
        );
        id
    }

    /// The caller behind a live session. Expired sessions are removed.
    pub fn session(&self, id: &Uuid) -> Option<Principal> {
        let ttl = self.session_ttl;
        match self.sessions.get(id) {
            None => return None,
            Some(session) if !session.is_expired(ttl) => return Some(session.principal.clone()),
            Some(_) => {}
        }

        if let Some((_, session)) = self.sessions.remove_if(id, |_, s| s.is_expired(ttl)) {
            info!(username = %session.principal.username, "session expired");
        }
        None
    }

    /// End a session. Returns `false` if it was not open.
    pub fn close_session(&self, id: &Uuid) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                info!(username = %session.principal.username, "session closed");
                true
            }
            None => false,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn purge_expired(&self) {
        let ttl = self.session_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(ttl));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!(purged, "expired sessions removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{Algorithm, Params, Version};

    fn cheap_hash(password: &str) -> String {
        let params = Params::new(8, 1, 1, None).unwrap();
        let salt = SaltString::generate(&mut OsRng);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn service() -> AuthService {
        AuthService::new([
            Account::new("root", cheap_hash("s3cret"), [Role::Admin, Role::User]),
            Account::new("ann", cheap_hash("hello"), [Role::User]),
        ])
    }

    #[test]
    fn hash_and_verify() {
        let hash = cheap_hash("correct-horse");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_username() {
        let auth = service();
        let root = auth.authenticate("root", "s3cret").await.unwrap();
        assert!(root.is_admin());

        let ann = auth.authenticate("ann", "hello").await.unwrap();
        assert!(!ann.is_admin());

        assert!(auth.authenticate("root", "nope").await.is_none());
        assert!(auth.authenticate("nobody", "s3cret").await.is_none());
    }

    #[tokio::test]
    async fn sessions_open_and_close() {
        let auth = service();
        let principal = auth.authenticate("ann", "hello").await.unwrap();
        let id = auth.open_session(principal.clone());

        assert_eq!(auth.session(&id), Some(principal));
        assert_eq!(auth.session_count(), 1);
        assert!(auth.close_session(&id));
        assert!(!auth.close_session(&id));
        assert_eq!(auth.session(&id), None);
    }

    #[tokio::test]
    async fn expired_sessions_are_evicted() {
        let auth = service().with_session_ttl(Duration::ZERO);
        let principal = auth.authenticate("ann", "hello").await.unwrap();

        let id = auth.open_session(principal.clone());
        assert_eq!(auth.session(&id), None);
        assert_eq!(auth.session_count(), 0);

        // Logins that never log out do not accumulate.
        for _ in 0..5 {
            auth.open_session(principal.clone());
        }
        assert_eq!(auth.session_count(), 1);
    }

    #[tokio::test]
    async fn live_sessions_survive_a_sweep() {
        let auth = service().with_session_ttl(Duration::from_secs(3600));
        let principal = auth.authenticate("ann", "hello").await.unwrap();

        let first = auth.open_session(principal.clone());
        let second = auth.open_session(principal.clone());
        assert_eq!(auth.session_count(), 2);
        assert_eq!(auth.session(&first), Some(principal.clone()));
        assert_eq!(auth.session(&second), Some(principal));
    }

    #[test]
    fn admin_from_config_prefers_hash_and_rejects_garbage() {
        let cfg = AppConfig {
            admin_password_hash: Some(cheap_hash("pw")),
            admin_password: Some("ignored".into()),
            ..AppConfig::default()
        };
        let account = Account::admin_from_config(&cfg).unwrap();
        assert!(account.principal().is_admin());
        assert_eq!(account.username, "admin");

        let broken = AppConfig {
            admin_password_hash: Some("not-a-phc-string".into()),
            ..AppConfig::default()
        };
        assert!(Account::admin_from_config(&broken).is_err());
    }
}
