use serde::Serialize;
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Connection string that selects the in-process store instead of Postgres
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_url: String,
    pub public_base_url: String,
    pub uploads_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Session lifetime in seconds, shared by the token expiry and cookie Max-Age
    pub session_ttl_secs: u64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationsConfig {
    #[serde(skip_serializing)]
    pub zoom_webhook_secret: Option<String>,
    #[serde(skip_serializing)]
    pub vimeo_access_token: Option<String>,
    pub vimeo_api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Presets first, then individual variables win
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        if let Some(v) = get("PORT") {
            config.server.port = parse_value("PORT", &v)?;
        }
        config.server.public_base_url = format!("http://localhost:{}", config.server.port);

        if let Some(v) = get("FRONTEND_URL") {
            config.server.frontend_url = parse_url("FRONTEND_URL", &v)?;
        }
        if let Some(v) = get("PUBLIC_BASE_URL") {
            config.server.public_base_url = parse_url("PUBLIC_BASE_URL", &v)?;
        }
        if let Some(v) = get("UPLOADS_DIR") {
            config.server.uploads_dir = PathBuf::from(v);
        }

        config.database.url = compose_database_url(&get)?;
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections = parse_value("DATABASE_MAX_CONNECTIONS", &v)?;
        }

        config.security.jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if let Some(v) = get("JWT_EXPIRES_IN") {
            config.security.session_ttl_secs = parse_duration(&v)
                .filter(|secs| *secs <= MAX_SESSION_TTL_SECS)
                .ok_or(ConfigError::Invalid {
                key: "JWT_EXPIRES_IN",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("COOKIE_NAME") {
            config.security.cookie_name = v;
        }
        if let Some(v) = get("COOKIE_SECURE") {
            config.security.cookie_secure = parse_value("COOKIE_SECURE", &v)?;
        }

        config.integrations.zoom_webhook_secret = get("ZOOM_WEBHOOK_SECRET");
        config.integrations.vimeo_access_token = get("VIMEO_ACCESS_TOKEN");
        if let Some(v) = get("VIMEO_API_URL") {
            config.integrations.vimeo_api_url = parse_url("VIMEO_API_URL", &v)?;
        }

        Ok(config)
    }

    fn base(environment: Environment, max_connections: u32, connection_timeout: u64, cookie_secure: bool) -> Self {
        Self {
            environment,
            server: ServerConfig {
                port: 4000,
                frontend_url: "http://localhost:5173".to_string(),
                public_base_url: "http://localhost:4000".to_string(),
                uploads_dir: PathBuf::from("uploads"),
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections,
                connection_timeout,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_ttl_secs: 24 * 60 * 60,
                cookie_name: "tuition_token".to_string(),
                cookie_secure,
            },
            integrations: IntegrationsConfig {
                zoom_webhook_secret: None,
                vimeo_access_token: None,
                vimeo_api_url: "https://api.vimeo.com".to_string(),
            },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development, 10, 30, false)
    }

    fn staging() -> Self {
        Self::base(Environment::Staging, 20, 10, true)
    }

    fn production() -> Self {
        Self::base(Environment::Production, 50, 5, true)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts
fn compose_database_url<F>(get: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("DATABASE_URL") {
        return Ok(url);
    }

    let host = get("DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL or DB_HOST"))?;
    let user = get("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let name = get("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
    let port: u16 = match get("DB_PORT") {
        Some(v) => parse_value("DB_PORT", &v)?,
        None => 5432,
    };

    let mut url = Url::parse("postgres://localhost").map_err(|_| ConfigError::Invalid {
        key: "DB_HOST",
        value: host.clone(),
    })?;
    let invalid_host = || ConfigError::Invalid { key: "DB_HOST", value: host.clone() };
    url.set_host(Some(&host)).map_err(|_| invalid_host())?;
    url.set_port(Some(port)).map_err(|_| invalid_host())?;
    url.set_username(&user).map_err(|_| invalid_host())?;
    if let Some(password) = get("DB_PASSWORD") {
        url.set_password(Some(&password)).map_err(|_| invalid_host())?;
    }
    url.set_path(&name);

    Ok(url.to_string())
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Upper bound on `JWT_EXPIRES_IN`: ten years
pub const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Parses `90`, `45s`, `30m`, `12h` or `7d` into seconds
pub fn parse_duration(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, multiplier) = match value.chars().last()? {
        's' => (&value[..value.len() - 1], 1),
        'm' => (&value[..value.len() - 1], 60),
        'h' => (&value[..value.len() - 1], 60 * 60),
        'd' => (&value[..value.len() - 1], 24 * 60 * 60),
        c if c.is_ascii_digit() => (value, 1),
        _ => return None,
    };
    let amount: u64 = digits.parse().ok()?;
    if amount == 0 {
        return None;
    }
    amount.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("1d"), Some(86_400));
        assert_eq!(parse_duration("12h"), Some(43_200));
        assert_eq!(parse_duration("30m"), Some(1_800));
        assert_eq!(parse_duration("45s"), Some(45));
        assert_eq!(parse_duration("3600"), Some(3_600));
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("1w"), None);
        assert_eq!(parse_duration("d"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_requires_jwt_secret() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "memory://")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_requires_database_settings() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL or DB_HOST"));
    }

    #[test]
    fn test_composes_database_url_from_parts() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DB_HOST", "db.internal"),
            ("DB_USER", "tuition"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "tuition_app"),
        ]))
        .unwrap();
        assert_eq!(config.database.url, "postgres://tuition:pw@db.internal:5432/tuition_app");
        assert!(!config.database.is_memory());
    }

    #[test]
    fn test_development_defaults() {
        let config =
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("DATABASE_URL", "memory://")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.public_base_url, "http://localhost:4000");
        assert_eq!(config.security.session_ttl_secs, 86_400);
        assert_eq!(config.security.cookie_name, "tuition_token");
        assert!(!config.security.cookie_secure);
        assert!(config.database.is_memory());
    }

    #[test]
    fn test_production_preset_with_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "postgres://localhost/app"),
            ("PORT", "8080"),
            ("JWT_EXPIRES_IN", "12h"),
            ("FRONTEND_URL", "https://portal.example.com/"),
            ("DATABASE_MAX_CONNECTIONS", "7"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert!(config.security.cookie_secure);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.frontend_url, "https://portal.example.com");
        assert_eq!(config.security.session_ttl_secs, 43_200);
        assert_eq!(config.database.max_connections, 7);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "memory://"),
            ("JWT_EXPIRES_IN", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRES_IN", .. }));
    }

    #[test]
    fn test_rejects_session_ttl_beyond_ten_years() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("DATABASE_URL", "memory://"),
            ("JWT_EXPIRES_IN", "3650d"),
        ]))
        .unwrap();
        assert_eq!(config.security.session_ttl_secs, MAX_SESSION_TTL_SECS);

        for too_long in ["3651d", "18446744073709551615"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("JWT_SECRET", "s"),
                ("DATABASE_URL", "memory://"),
                ("JWT_EXPIRES_IN", too_long),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRES_IN", .. }));
        }
    }
}
