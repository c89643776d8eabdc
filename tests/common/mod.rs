//! Shared fixtures for integration tests: in-memory store, scripted image
//! host, fixed identities and a hand-rolled multipart body.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Mutex;
use uuid::Uuid;

use property_pulse::auth::{IdentityResolver, SessionUser};
use property_pulse::config::{CloudinaryConfig, Config, GoogleConfig};
use property_pulse::form::UnknownFieldPolicy;
use property_pulse::images::{HostError, ImageHost};
use property_pulse::store::{Database, DbConfig};

pub const BASE_URL: &str = "http://pulse.test";
pub const IMAGE_FOLDER: &str = "propertypulse";

/// Config for a fresh in-memory database
pub fn memory_db_config() -> DbConfig {
    DbConfig {
        url: "mem://".to_string(),
        namespace: "test".to_string(),
        database: Uuid::new_v4().simple().to_string(),
        username: None,
        password: None,
    }
}

pub fn memory_db() -> Database {
    Database::new(memory_db_config())
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        public_base_url: BASE_URL.to_string(),
        database: memory_db_config(),
        session_secret: "integration-test-secret".to_string(),
        session_ttl_secs: 3600,
        google: GoogleConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
        },
        cloudinary: CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        },
        image_folder: IMAGE_FOLDER.to_string(),
        unknown_fields: UnknownFieldPolicy::Ignore,
    }
}

/// Image host that records every data URI and fails on one chosen call
pub struct ScriptedHost {
    fail_on: Option<usize>,
    pub uploads: Mutex<Vec<String>>,
}

impl ScriptedHost {
    pub fn working() -> Self {
        Self {
            fail_on: None,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageHost for ScriptedHost {
    async fn upload(&self, data_uri: String, folder: &str) -> Result<String, HostError> {
        let mut uploads = self.uploads.lock().unwrap();
        let n = uploads.len();
        uploads.push(data_uri);

        if self.fail_on == Some(n) {
            return Err(HostError::Rejected {
                status: 500,
                body: "host unavailable".to_string(),
            });
        }
        Ok(format!("https://img.test/{folder}/{n}.png"))
    }

    fn host_name(&self) -> &'static str {
        "scripted"
    }
}

/// Resolves every request to the same user, or to nobody
pub struct FixedIdentity(pub Option<SessionUser>);

impl FixedIdentity {
    pub fn user(id: &str) -> Self {
        Self(Some(SessionUser {
            user_id: id.to_string(),
            email: format!("{id}@example.com"),
            name: id.to_string(),
            image: None,
        }))
    }

    pub fn nobody() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IdentityResolver for FixedIdentity {
    async fn resolve(&self, _headers: &HeaderMap) -> Option<SessionUser> {
        self.0.clone()
    }
}

/// Builds a `multipart/form-data` body
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----pulse-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content type header value and the finished body
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
