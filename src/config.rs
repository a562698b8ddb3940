/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

/// Upper bound for `ACCESS_TOKEN_TTL_SECONDS` (one day).
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

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

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub database_max_connections: u32,
    pub database_run_migrations: bool,

    pub cors_allowed_origins: Vec<String>,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,
    pub extra_public_paths: Vec<String>,

    pub access_jwt_private_key_pem: String,
    pub access_jwt_public_key_pem: String,

    // upstream OAuth2 / OIDC provider whose id_token proves the login email
    pub upstream_id_token_issuer: String,
    pub upstream_id_token_audience: String,
    pub upstream_id_token_algorithm: Algorithm,
    pub upstream_id_token_public_key_pem: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // database_url may carry a password, keys are secrets
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database_max_connections", &self.database_max_connections)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("extra_public_paths", &self.extra_public_paths)
            .field("upstream_id_token_issuer", &self.upstream_id_token_issuer)
            .field("upstream_id_token_audience", &self.upstream_id_token_audience)
            .field("upstream_id_token_algorithm", &self.upstream_id_token_algorithm)
            .finish_non_exhaustive()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Missing → 3600. Zero or above one day is rejected.
fn access_token_ttl(value: Option<&str>) -> Result<u64, ConfigError> {
    let invalid = ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS");
    let ttl = match value {
        Some(v) => v.trim().parse::<u64>().map_err(|_| invalid)?,
        None => return Ok(3600),
    };
    if ttl == 0 || ttl > MAX_ACCESS_TOKEN_TTL_SECONDS {
        return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
    }
    Ok(ttl)
}

/// Asymmetric algorithms only: the service holds the provider's public key, never a shared secret.
fn upstream_algorithm(value: &str) -> Option<Algorithm> {
    let algorithm = Algorithm::from_str(value.trim()).ok()?;
    match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512
        | Algorithm::ES256
        | Algorithm::ES384
        | Algorithm::EdDSA => Some(algorithm),
        _ => None,
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn pem(key: &'static str) -> Result<String, ConfigError> {
    Ok(required(key)?.replace("\\n", "\n"))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match std::env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = required("DATABASE_URL")?;

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let database_run_migrations = match std::env::var("DATABASE_RUN_MIGRATIONS") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("DATABASE_RUN_MIGRATIONS"))?,
            Err(_) => true,
        };

        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let sqids_min_length = std::env::var("SQIDS_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let sqids_alphabet = std::env::var("SQIDS_ALPHABET").unwrap_or_else(|_| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let auth_issuer = required("AUTH_ISSUER")?;
        let auth_audience = required("AUTH_AUDIENCE")?;

        let access_token_ttl_seconds =
            access_token_ttl(std::env::var("ACCESS_TOKEN_TTL_SECONDS").ok().as_deref())?;

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let extra_public_paths =
            split_list(&std::env::var("AUTH_EXTRA_PUBLIC_PATHS").unwrap_or_default());

        let access_jwt_private_key_pem = pem("ACCESS_JWT_PRIVATE_KEY_PEM")?;
        let access_jwt_public_key_pem = pem("ACCESS_JWT_PUBLIC_KEY_PEM")?;

        let upstream_id_token_issuer = required("UPSTREAM_ID_TOKEN_ISSUER")?;
        let upstream_id_token_audience = required("UPSTREAM_ID_TOKEN_AUDIENCE")?;
        let upstream_id_token_algorithm = match std::env::var("UPSTREAM_ID_TOKEN_ALGORITHM") {
            Ok(v) => upstream_algorithm(&v)
                .ok_or(ConfigError::Invalid("UPSTREAM_ID_TOKEN_ALGORITHM"))?,
            Err(_) => Algorithm::RS256,
        };
        let upstream_id_token_public_key_pem = pem("UPSTREAM_ID_TOKEN_PUBLIC_KEY_PEM")?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            database_run_migrations,
            cors_allowed_origins,
            sqids_min_length,
            sqids_alphabet,
            auth_issuer,
            auth_audience,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
            extra_public_paths,
            access_jwt_private_key_pem,
            access_jwt_public_key_pem,
            upstream_id_token_issuer,
            upstream_id_token_audience,
            upstream_id_token_algorithm,
            upstream_id_token_public_key_pem,
        })
    }
}
