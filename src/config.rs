use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

/// Object store the upload relay forwards files to.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Fixed key prefix every uploaded object lands under.
    pub folder: String,
    pub public_base_url: String,
    pub tmp_dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub cors_origin: Option<String>,
    pub jwt: JwtConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
        };

        let endpoint = std::env::var("S3_ENDPOINT").unwrap_or_default();
        let bucket = std::env::var("S3_BUCKET").unwrap_or_default();
        let public_base_url = std::env::var("UPLOAD_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));
        let upload = UploadConfig {
            access_key: std::env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("S3_SECRET_KEY").unwrap_or_default(),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            folder: std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".into()),
            tmp_dir: std::env::var("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            max_bytes: parse_or("UPLOAD_MAX_BYTES", 20 * 1024 * 1024),
            endpoint,
            bucket,
            public_base_url,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("APP_PORT", 8080),
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
            jwt,
            upload,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
