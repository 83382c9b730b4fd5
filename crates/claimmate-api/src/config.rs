//! Server configuration read from the environment.
//!
//! Every option has a default except `DATABASE_URL`, which is required when
//! `STORAGE_MODE=postgres` (the default). The in-memory store is only ever
//! selected by an explicit `STORAGE_MODE=memory`.

use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use claimmate_core::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_FILE_PUBLIC_BASE_URL: &str = "/files";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 100 * 1024 * 1024;
pub const DEFAULT_EMAIL_SEND_DELAY_MS: u64 = 1000;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Where claims and timelines are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Postgres,
    /// Process memory only; responses are flagged `demo: true`.
    Memory,
}

impl FromStr for StorageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageMode::Postgres),
            "memory" => Ok(StorageMode::Memory),
            other => Err(Error::Config(format!(
                "STORAGE_MODE must be 'postgres' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage_mode: StorageMode,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub file_storage_path: Option<PathBuf>,
    pub file_public_base_url: String,
    pub max_upload_bytes: u64,
    pub max_request_bytes: usize,
    pub email_send_delay_ms: u64,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage_mode: StorageMode::default(),
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            file_storage_path: None,
            file_public_base_url: DEFAULT_FILE_PUBLIC_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            email_send_delay_ms: DEFAULT_EMAIL_SEND_DELAY_MS,
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

impl ServerConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let storage_mode = match var("STORAGE_MODE") {
            Some(mode) => mode.parse()?,
            None => StorageMode::default(),
        };
        let database_url = var("DATABASE_URL");
        if storage_mode == StorageMode::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "DATABASE_URL is required when STORAGE_MODE=postgres (set STORAGE_MODE=memory for demo mode)"
                    .to_string(),
            ));
        }

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", var("PORT"), defaults.port)?,
            storage_mode,
            database_url,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                var("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            )?,
            file_storage_path: var("FILE_STORAGE_PATH").map(PathBuf::from),
            file_public_base_url: var("FILE_PUBLIC_BASE_URL")
                .unwrap_or(defaults.file_public_base_url),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                var("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            )?,
            max_request_bytes: parse_or(
                "MAX_REQUEST_BYTES",
                var("MAX_REQUEST_BYTES"),
                defaults.max_request_bytes,
            )?,
            email_send_delay_ms: parse_or(
                "EMAIL_SEND_DELAY_MS",
                var("EMAIL_SEND_DELAY_MS"),
                defaults.email_send_delay_ms,
            )?,
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.allowed_origins),
        })
    }

    /// Router path that serves stored attachments, if the public base URL
    /// points at this server (`/files`) rather than another host.
    pub fn file_mount_path(&self) -> Option<&str> {
        let path = self.file_public_base_url.trim_end_matches('/');
        (path.starts_with('/') && path.len() > 1).then_some(path)
    }

    /// CORS origins as header values; invalid entries are logged and dropped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                    None
                }
            })
            .collect()
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", name, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = ServerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_memory_mode_is_explicit() {
        let config = ServerConfig::from_lookup(lookup(&[("STORAGE_MODE", "memory")])).unwrap();
        assert_eq!(config.storage_mode, StorageMode::Memory);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.email_send_delay_ms, DEFAULT_EMAIL_SEND_DELAY_MS);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_postgres_with_url() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/claimmate"),
            ("PORT", "8080"),
            ("DB_MAX_CONNECTIONS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.storage_mode, StorageMode::Postgres);
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 4);
    }

    #[test]
    fn test_invalid_storage_mode() {
        assert!(ServerConfig::from_lookup(lookup(&[("STORAGE_MODE", "sqlite")])).is_err());
    }

    #[test]
    fn test_invalid_number() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("STORAGE_MODE", "memory"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STORAGE_MODE", "memory"),
            ("HOST", "  "),
            ("FILE_STORAGE_PATH", ""),
        ]))
        .unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert!(config.file_storage_path.is_none());
    }

    #[test]
    fn test_file_mount_path() {
        let mut config = ServerConfig::default();
        assert_eq!(config.file_mount_path(), Some("/files"));

        config.file_public_base_url = "/uploads/".to_string();
        assert_eq!(config.file_mount_path(), Some("/uploads"));

        config.file_public_base_url = "https://cdn.example.com/claims".to_string();
        assert_eq!(config.file_mount_path(), None);

        config.file_public_base_url = "/".to_string();
        assert_eq!(config.file_mount_path(), None);
    }

    #[test]
    fn test_allowed_origins_split() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STORAGE_MODE", "memory"),
            ("ALLOWED_ORIGINS", "https://a.example, ,http://localhost:5173"),
        ]))
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "http://localhost:5173"]
        );
        assert_eq!(config.cors_origins().len(), 2);
    }
}
