use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub admin_username: String,
    /// Argon2 PHC string for the admin account.
    pub admin_password_hash: Option<String>,
    /// Plaintext admin password, hashed at startup. Environment only.
    pub admin_password: Option<String>,
    /// Populate an empty store with sample entries at startup.
    pub seed: bool,
    /// Lifetime of a login session, in minutes.
    pub session_ttl_minutes: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Guestbook web application")]
pub struct Args {
    /// Host to bind to (overrides GUESTBOOK_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GUESTBOOK_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides GUESTBOOK_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Administrator login name (overrides GUESTBOOK_ADMIN_USERNAME)
    #[arg(long)]
    pub admin_username: Option<String>,

    /// Argon2 PHC hash of the administrator password (overrides GUESTBOOK_ADMIN_PASSWORD_HASH)
    #[arg(long)]
    pub admin_password_hash: Option<String>,

    /// Login session lifetime in minutes (overrides GUESTBOOK_SESSION_TTL_MINUTES)
    #[arg(long)]
    pub session_ttl_minutes: Option<u64>,

    /// Do not insert sample entries into an empty guestbook
    #[arg(long)]
    pub no_seed: bool,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            database_url: "sqlite://./data/guestbook.db".into(),
            admin_username: "admin".into(),
            admin_password_hash: None,
            admin_password: None,
            seed: true,
            session_ttl_minutes: 8 * 60,
        }
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::from_args(Args::parse())
    }

    /// Merge already-parsed CLI args over the environment and defaults.
    pub fn from_args(args: Args) -> Result<(Self, bool)> {
        let defaults = Self::default();

        // --- Environment fallback ---
        let env_host = env::var("GUESTBOOK_HOST").unwrap_or(defaults.host);
        let env_port = match env::var("GUESTBOOK_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing GUESTBOOK_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => defaults.port,
            Err(err) => return Err(err).context("reading GUESTBOOK_PORT"),
        };
        let env_db = env::var("GUESTBOOK_DATABASE_URL").unwrap_or(defaults.database_url);
        let env_admin = env::var("GUESTBOOK_ADMIN_USERNAME").unwrap_or(defaults.admin_username);
        let env_hash = env::var("GUESTBOOK_ADMIN_PASSWORD_HASH").ok();
        let env_password = env::var("GUESTBOOK_ADMIN_PASSWORD").ok();
        let env_seed = match env::var("GUESTBOOK_SEED") {
            Ok(value) => parse_flag(&value)
                .with_context(|| format!("parsing GUESTBOOK_SEED value `{}`", value))?,
            Err(env::VarError::NotPresent) => defaults.seed,
            Err(err) => return Err(err).context("reading GUESTBOOK_SEED"),
        };

        let env_ttl = match env::var("GUESTBOOK_SESSION_TTL_MINUTES") {
            Ok(value) => value.parse::<u64>().with_context(|| {
                format!("parsing GUESTBOOK_SESSION_TTL_MINUTES value `{}`", value)
            })?,
            Err(env::VarError::NotPresent) => defaults.session_ttl_minutes,
            Err(err) => return Err(err).context("reading GUESTBOOK_SESSION_TTL_MINUTES"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            admin_username: args.admin_username.unwrap_or(env_admin),
            admin_password_hash: args.admin_password_hash.or(env_hash),
            admin_password: env_password.filter(|p| !p.is_empty()),
            seed: env_seed && !args.no_seed,
            session_ttl_minutes: args.session_ttl_minutes.unwrap_or(env_ttl),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes.saturating_mul(60))
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password_hash",
                &self.admin_password_hash.as_ref().map(|_| "<set>"),
            )
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "<redacted>"),
            )
            .field("seed", &self.seed)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .finish()
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got `{}`", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_defaults() {
        let args = Args::try_parse_from([
            "guestbook",
            "--port",
            "9001",
            "--database-url",
            "sqlite::memory:",
            "--no-seed",
            "--migrate",
            "--session-ttl-minutes",
            "15",
        ])
        .unwrap();
        let (cfg, migrate) = AppConfig::from_args(args).unwrap();
        assert_eq!(cfg.port, 9001);
        assert_eq!(cfg.session_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert!(!cfg.seed);
        assert!(migrate);
    }

    #[test]
    fn addr_joins_host_and_port() {
        let cfg = AppConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            ..AppConfig::default()
        };
        assert_eq!(cfg.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn debug_output_redacts_password() {
        let cfg = AppConfig {
            admin_password: Some("hunter2".into()),
            ..AppConfig::default()
        };
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn boolean_flags() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
