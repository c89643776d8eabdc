use anyhow::Result;
use std::sync::Arc;

use crate::auth::{GoogleOAuth, IdentityResolver, SessionKeys, SessionResolver};
use crate::config::Config;
use crate::images::{CloudinaryClient, ImageHost};
use crate::pipeline::SubmissionPipeline;
use crate::store::Database;

/// Shared per-process state handed to every handler
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub images: Arc<dyn ImageHost>,
    pub sessions: SessionKeys,
    pub google: GoogleOAuth,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let images = CloudinaryClient::new(config.cloudinary.clone())?;
        Self::with_image_host(config, Arc::new(images))
    }

    /// Build state around a specific image host. The store is not contacted
    /// until the first request needs it.
    pub fn with_image_host(config: Config, images: Arc<dyn ImageHost>) -> Result<Arc<Self>> {
        let db = Database::new(config.database.clone());
        let sessions = SessionKeys::new(&config.session_secret, config.session_ttl_secs);
        let google = GoogleOAuth::new(config.google.clone(), &config.public_base_url)?;

        Ok(Arc::new(Self {
            config,
            db,
            images,
            sessions,
            google,
        }))
    }

    pub fn identity(&self) -> SessionResolver<'_> {
        SessionResolver::new(&self.sessions, &self.db)
    }

    pub fn pipeline<'a>(&'a self, identity: &'a dyn IdentityResolver) -> SubmissionPipeline<'a> {
        SubmissionPipeline {
            identity,
            images: self.images.as_ref(),
            store: &self.db,
            image_folder: &self.config.image_folder,
            unknown_fields: self.config.unknown_fields,
            public_base_url: &self.config.public_base_url,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.config.public_base_url.starts_with("https://")
    }
}
