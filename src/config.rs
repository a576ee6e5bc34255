use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context};

const MIN_SECRET_LEN: usize = 32;
const MAX_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
    pub jwt_secret: Vec<u8>,
    pub session_ttl: Duration,
    pub static_dir: String,
    pub cors_allow: Vec<String>,
    pub seed_default_users: bool,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads configuration from `.env` and the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, used by tests to avoid
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL tidak ditemukan")?;

        let listen_addr: SocketAddr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .context("LISTEN_ADDR tidak valid")?;

        let max_connections: u32 = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().context("DB_MAX_CONNECTIONS harus berupa angka")?,
            None => 5,
        };

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET tidak ditemukan")?;
        let jwt_secret = jwt_secret.trim().as_bytes().to_vec();
        if jwt_secret.len() < MIN_SECRET_LEN {
            bail!("JWT_SECRET minimal {MIN_SECRET_LEN} karakter");
        }

        let ttl_secs: u64 = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw.parse().context("SESSION_TTL_SECS harus berupa angka")?,
            None => 60 * 60 * 24,
        };
        if !(1..=MAX_SESSION_TTL_SECS).contains(&ttl_secs) {
            bail!("SESSION_TTL_SECS harus antara 1 dan {MAX_SESSION_TTL_SECS}");
        }

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| "../fe/dist".into());

        let cors_allow = lookup("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let seed_default_users = matches!(
            lookup("SEED_DEFAULT_USERS").as_deref().map(str::trim),
            Some("1" | "true" | "TRUE" | "yes")
        );

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT tidak dikenal: {other}"),
        };

        Ok(Self {
            database_url,
            listen_addr,
            max_connections,
            jwt_secret,
            session_ttl: Duration::from_secs(ttl_secs),
            static_dir,
            cors_allow,
            seed_default_users,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/zakat"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.session_ttl, Duration::from_secs(86_400));
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert!(!config.seed_default_users);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/zakat"),
            ("JWT_SECRET", "short"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn session_ttl_must_fit_a_token_expiry() {
        for ttl in ["0", "31536001", "18446744073709551615"] {
            let err = Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://localhost/zakat"),
                ("JWT_SECRET", SECRET),
                ("SESSION_TTL_SECS", ttl),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("SESSION_TTL_SECS"), "{ttl}");
        }

        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/zakat"),
            ("JWT_SECRET", SECRET),
            ("SESSION_TTL_SECS", "31536000"),
        ]))
        .unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(31_536_000));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).is_err());
    }

    #[test]
    fn parses_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/zakat"),
            ("JWT_SECRET", SECRET),
            ("LISTEN_ADDR", "0.0.0.0:8080"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("CORS_ALLOW_ORIGINS", "http://a.test, http://b.test,"),
            ("SEED_DEFAULT_USERS", "true"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
        assert!(config.seed_default_users);
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
