/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, introspection サービスの URL, timeout, body limit など)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Outer HTTP layers (middleware::http)
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,

    // Token introspection service (`GET <base>/oauth/access_token/<id>`)
    pub oauth_base_url: Url,
    pub oauth_timeout: Duration,
    pub reject_unknown_tokens: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let request_timeout_ms = positive(&lookup, "REQUEST_TIMEOUT_MS", 30_000)?;
        let body_limit_bytes = positive(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024)?;
        let body_limit_bytes =
            usize::try_from(body_limit_bytes).map_err(|_| ConfigError::Invalid("BODY_LIMIT_BYTES"))?;

        let oauth_base_url = lookup("OAUTH_BASE_URL")
            .unwrap_or_else(|| "http://localhost:8080".to_string());
        let oauth_base_url =
            Url::parse(oauth_base_url.trim()).map_err(|_| ConfigError::Invalid("OAUTH_BASE_URL"))?;
        if oauth_base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid("OAUTH_BASE_URL"));
        }

        let oauth_timeout_ms = positive(&lookup, "OAUTH_TIMEOUT_MS", 3000)?;

        let reject_unknown_tokens = match lookup("OAUTH_REJECT_UNKNOWN_TOKENS").as_deref() {
            None => false,
            Some("true" | "1") => true,
            Some("false" | "0") => false,
            Some(_) => return Err(ConfigError::Invalid("OAUTH_REJECT_UNKNOWN_TOKENS")),
        };

        Ok(Self {
            addr,
            app_env,
            request_timeout: Duration::from_millis(request_timeout_ms),
            body_limit_bytes,
            oauth_base_url,
            oauth_timeout: Duration::from_millis(oauth_timeout_ms),
            reject_unknown_tokens,
        })
    }
}

// Non-zero integer, `default` when unset.
fn positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "configuration error");
        AppError::Internal
    }
}
