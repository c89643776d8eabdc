use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::auth::{AuthError, Profile};
use crate::config::GoogleConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub const CALLBACK_PATH: &str = "/api/auth/callback/google";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Application side of Google's authorization-code flow
pub struct GoogleOAuth {
    client: Client,
    config: GoogleConfig,
    redirect_uri: String,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig, public_base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            redirect_uri: format!("{public_base_url}{CALLBACK_PATH}"),
        })
    }

    /// Consent-screen URL; `state` must come back unchanged on the callback.
    pub fn authorize_url(&self, state: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("prompt", "consent")
            .append_pair("access_type", "offline")
            .append_pair("state", state)
            .finish();

        format!("{AUTHORIZE_URL}?{query}")
    }

    /// Trade an authorization code for the signed-in profile.
    pub async fn exchange(&self, code: &str) -> Result<Profile, AuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.client.post(TOKEN_URL).form(&params).send().await?;
        if !response.status().is_success() {
            warn!("Google token endpoint returned status: {}", response.status());
            return Err(AuthError::Provider(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;

        let info: UserInfo = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = info
            .email
            .ok_or_else(|| AuthError::Provider("profile has no email".to_string()))?;
        debug!(%email, "Fetched Google profile");

        let name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(Profile {
            email,
            name,
            picture: info.picture,
        })
    }
}
