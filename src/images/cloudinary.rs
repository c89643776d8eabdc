use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CloudinaryConfig;
use crate::images::traits::ImageHost;
use crate::images::HostError;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Signed uploads to Cloudinary's image API
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!("{API_BASE}/{}/image/upload", self.config.cloud_name)
    }
}

/// Sign upload parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed with SHA-256.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, data_uri: String, folder: &str) -> Result<String, HostError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let form = [
            ("file", data_uri.as_str()),
            ("folder", folder),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self.client.post(self.upload_url()).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Cloudinary returned status: {}", status);
            return Err(HostError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        debug!(url = %uploaded.secure_url, "Cloudinary upload complete");

        Ok(uploaded.secure_url)
    }

    fn host_name(&self) -> &'static str {
        "Cloudinary"
    }
}
