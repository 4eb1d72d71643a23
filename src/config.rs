use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` keeps records in process memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub s3: Option<S3Config>,
    pub cleanup_orphaned_uploads: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let s3 = match (env_opt("S3_ENDPOINT"), env_opt("S3_BUCKET")) {
            (Some(endpoint), Some(bucket)) => Some(S3Config {
                endpoint,
                bucket,
                access_key: std::env::var("S3_ACCESS_KEY")
                    .context("S3_ACCESS_KEY is required when S3_ENDPOINT and S3_BUCKET are set")?,
                secret_key: std::env::var("S3_SECRET_KEY")
                    .context("S3_SECRET_KEY is required when S3_ENDPOINT and S3_BUCKET are set")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            }),
            _ => None,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("APP_PORT", 3019),
            database_url: env_opt("DATABASE_URL"),
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
            s3,
            cleanup_orphaned_uploads: parse_or("CLEANUP_ORPHANED_UPLOADS", false),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3019,
            database_url: None,
            database_max_connections: 10,
            upload_dir: "uploads".into(),
            max_upload_bytes: 20 * 1024 * 1024,
            s3: None,
            cleanup_orphaned_uploads: false,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
