use anyhow::{anyhow, Context, Result};
use std::{env, fmt::Display, fs::read_to_string, str::FromStr};
use tracing::{info, warn};

use crate::form::UnknownFieldPolicy;
use crate::store::DbConfig;

/// Cloudinary account used as the image host
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Google OAuth client credentials
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Process configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL used to build absolute redirects, without trailing slash
    pub public_base_url: String,
    pub database: DbConfig,
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub google: GoogleConfig,
    pub cloudinary: CloudinaryConfig,
    pub image_folder: String,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Secrets are read from the variable of the same name, or from
    /// `/run/secrets/<NAME>` when the variable is absent.
    pub fn from_env() -> Result<Self> {
        let public_base_url: String = try_load("PUBLIC_BASE_URL", "http://localhost:3000")?;

        Ok(Self {
            port: try_load("PORT", "3000")?,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            database: DbConfig {
                url: try_load("DATABASE_URL", "mem://")?,
                namespace: try_load("DATABASE_NAMESPACE", "propertypulse")?,
                database: try_load("DATABASE_NAME", "main")?,
                username: env::var("DATABASE_USER").ok(),
                password: optional_secret("DATABASE_PASS"),
            },
            session_secret: read_secret("SESSION_SECRET")?,
            session_ttl_secs: try_load("SESSION_TTL_SECS", "2592000")?,
            google: GoogleConfig {
                client_id: read_secret("GOOGLE_CLIENT_ID")?,
                client_secret: read_secret("GOOGLE_CLIENT_SECRET")?,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: read_secret("CLOUDINARY_CLOUD_NAME")?,
                api_key: read_secret("CLOUDINARY_API_KEY")?,
                api_secret: read_secret("CLOUDINARY_API_SECRET")?,
            },
            image_folder: try_load("IMAGE_FOLDER", "propertypulse")?,
            unknown_fields: try_load("UNKNOWN_FIELDS", "ignore")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("invalid value for {key}: {e}")
    })
}

fn read_secret(name: &str) -> Result<String> {
    if let Ok(value) = env::var(name) {
        return Ok(value);
    }

    let path = format!("/run/secrets/{name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("{name} is not set and {path} could not be read"))
}

fn optional_secret(name: &str) -> Option<String> {
    read_secret(name).ok()
}
