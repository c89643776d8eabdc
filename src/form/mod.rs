pub mod schema;

pub use schema::{decode, CandidateFields, CandidateRates};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use std::str::FromStr;

/// One binary file part of a multipart submission
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Value of a single multipart part
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(Attachment),
}

/// Every part of a submission, in the order it was received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawForm {
    pub parts: Vec<(String, FormValue)>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, attachment: Attachment) -> Self {
        self.parts.push((name.into(), FormValue::File(attachment)));
        self
    }
}

/// What to do with form keys the property schema does not know about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    #[default]
    Ignore,
    Reject,
}

impl FromStr for UnknownFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected `ignore` or `reject`, got `{other}`")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("expected a multipart body: {0}")]
    NotMultipart(#[from] MultipartRejection),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("unrecognized form field `{0}`")]
    UnknownField(String),

    #[error("form fields do not fit the property shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Something a submission's parts can be read from.
///
/// Reading is deferred until the pipeline reaches its decoding stage, so a
/// request body is never consumed for an unauthenticated caller.
#[async_trait]
pub trait FormSource: Send {
    async fn read_form(self) -> Result<RawForm, DecodeError>;
}

#[async_trait]
impl FormSource for RawForm {
    async fn read_form(self) -> Result<RawForm, DecodeError> {
        Ok(self)
    }
}

#[async_trait]
impl FormSource for Multipart {
    async fn read_form(mut self) -> Result<RawForm, DecodeError> {
        let mut form = RawForm::new();

        while let Some(field) = self.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form = form.file(
                        name,
                        Attachment {
                            filename,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form = form.text(name, value);
                }
            }
        }

        Ok(form)
    }
}

/// A body that failed multipart extraction. The error only surfaces once the
/// pipeline reaches decoding.
#[async_trait]
impl FormSource for Result<Multipart, MultipartRejection> {
    async fn read_form(self) -> Result<RawForm, DecodeError> {
        self?.read_form().await
    }
}
