use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::credentials::PasswordPolicy;
use crate::workflows::placement::TransitionPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub lifecycle: LifecycleConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_url =
            env::var("APP_DATABASE_URL").unwrap_or_else(|_| "sqlite://placement.db".to_string());
        let max_connections = number_var::<u32>("APP_DATABASE_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "APP_DATABASE_MAX_CONNECTIONS",
            });
        }

        let session_cookie =
            env::var("APP_SESSION_COOKIE").unwrap_or_else(|_| "placement_session".to_string());
        let session_ttl_minutes = number_var::<i64>("APP_SESSION_TTL_MINUTES", 720)?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidNumber {
                key: "APP_SESSION_TTL_MINUTES",
            });
        }

        let password_policy = policy_var("APP_PASSWORD_POLICY", "strict", |raw| {
            match raw {
                "strict" => Some(PasswordPolicy::Strict),
                "medium" => Some(PasswordPolicy::Medium),
                _ => None,
            }
        })?;
        let transition_policy = policy_var("APP_TRANSITION_POLICY", "strict", |raw| match raw {
            "strict" => Some(TransitionPolicy::Strict),
            "permissive" => Some(TransitionPolicy::Permissive),
            _ => None,
        })?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                session_cookie,
                session_ttl_minutes,
                secure_cookies: environment == AppEnvironment::Production,
                password_policy,
            },
            lifecycle: LifecycleConfig { transition_policy },
        })
    }
}

fn number_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn policy_var<T>(
    key: &'static str,
    default: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    parse(raw.trim().to_ascii_lowercase().as_str())
        .ok_or(ConfigError::InvalidPolicy { key, value: raw })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Relational store connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session and credential rules.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_cookie: String,
    pub session_ttl_minutes: i64,
    pub secure_cookies: bool,
    pub password_policy: PasswordPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: "placement_session".to_string(),
            session_ttl_minutes: 720,
            secure_cookies: false,
            password_policy: PasswordPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LifecycleConfig {
    pub transition_policy: TransitionPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidPolicy { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a positive integer")
            }
            ConfigError::InvalidPolicy { key, value } => {
                write!(f, "{key} has unsupported value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidPolicy { .. } => None,
        }
    }
}
