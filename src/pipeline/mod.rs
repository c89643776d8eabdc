//! Property submission pipeline.
//!
//! A creation request moves through the stages of [`Stage`] strictly in
//! order: the requester is authenticated, the form is decoded, images are
//! uploaded, the listing is assembled and then stored. The first failing
//! stage ends the request and nothing is stored.

pub mod assemble;

pub use assemble::{assemble, RejectedInput};

use axum::http::HeaderMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::auth::IdentityResolver;
use crate::error::{InvalidInput, SubmissionError};
use crate::form::{self, FormSource, UnknownFieldPolicy};
use crate::images::{self, ImageHost};
use crate::models::Property;
use crate::store::PropertyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Authenticating,
    Decoding,
    Uploading,
    Assembling,
    Persisting,
    Redirecting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Authenticating => "authenticating",
            Stage::Decoding => "decoding",
            Stage::Uploading => "uploading",
            Stage::Assembling => "assembling",
            Stage::Persisting => "persisting",
            Stage::Redirecting => "redirecting",
        };
        f.write_str(name)
    }
}

/// A stored listing and where to send the client next
#[derive(Debug, Clone)]
pub struct Submitted {
    pub property: Property,
    pub location: String,
}

/// Collaborators for one creation request
pub struct SubmissionPipeline<'a> {
    pub identity: &'a dyn IdentityResolver,
    pub images: &'a dyn ImageHost,
    pub store: &'a dyn PropertyStore,
    pub image_folder: &'a str,
    pub unknown_fields: UnknownFieldPolicy,
    /// Base of the detail-page redirect, without trailing slash
    pub public_base_url: &'a str,
}

impl SubmissionPipeline<'_> {
    pub async fn submit<F: FormSource>(
        &self,
        headers: &HeaderMap,
        source: F,
    ) -> Result<Submitted, SubmissionError> {
        let result = self.run(headers, source).await;

        match &result {
            Ok(submitted) => info!(
                property_id = %submitted.property.id,
                images = submitted.property.images.len(),
                "Property created"
            ),
            Err(e) => warn!(stage = %e.halted_at(), error = %e, "Property submission halted"),
        }

        result
    }

    async fn run<F: FormSource>(
        &self,
        headers: &HeaderMap,
        source: F,
    ) -> Result<Submitted, SubmissionError> {
        enter(Stage::Received);

        enter(Stage::Authenticating);
        let user = self
            .identity
            .resolve(headers)
            .await
            .ok_or(SubmissionError::Unauthorized)?;

        enter(Stage::Decoding);
        let raw = source.read_form().await.map_err(SubmissionError::from_decode)?;
        let mut fields = form::decode(raw, self.unknown_fields).map_err(SubmissionError::from_decode)?;
        let attachments = std::mem::take(&mut fields.images);

        enter(Stage::Uploading);
        let urls = images::upload_all(self.images, self.image_folder, &attachments).await?;

        enter(Stage::Assembling);
        let listing = assemble(fields, urls, &user.user_id).map_err(InvalidInput::from)?;

        enter(Stage::Persisting);
        let property = self.store.create_one(listing).await?;

        enter(Stage::Redirecting);
        let location = format!("{}/properties/{}", self.public_base_url, property.id);

        Ok(Submitted { property, location })
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "Submission stage");
}
