pub mod cloudinary;
pub mod traits;

pub use cloudinary::CloudinaryClient;
pub use traits::ImageHost;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};

use crate::form::Attachment;

const FALLBACK_CONTENT_TYPE: &str = "image/png";

/// Failure reported by an [`ImageHost`]
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("request to image host failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image host rejected the upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}

/// An attachment that could not be uploaded. Aborts the whole submission.
#[derive(Debug, thiserror::Error)]
#[error("uploading image #{index} ({filename}) failed: {source}")]
pub struct UploadError {
    pub index: usize,
    pub filename: String,
    #[source]
    pub source: HostError,
}

/// Encode an attachment as a base64 data URI.
pub fn data_uri(attachment: &Attachment) -> String {
    let content_type = attachment
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE);

    format!("data:{content_type};base64,{}", STANDARD.encode(&attachment.bytes))
}

/// Upload attachments one at a time, in order.
///
/// The returned URLs line up with `attachments`. The first failure stops the
/// loop; images already uploaded stay on the host.
pub async fn upload_all(
    host: &dyn ImageHost,
    folder: &str,
    attachments: &[Attachment],
) -> Result<Vec<String>, UploadError> {
    if attachments.is_empty() {
        return Ok(Vec::new());
    }

    info!(
        count = attachments.len(),
        host = host.host_name(),
        "Uploading images"
    );

    let mut urls = Vec::with_capacity(attachments.len());
    for (index, attachment) in attachments.iter().enumerate() {
        let url = host
            .upload(data_uri(attachment), folder)
            .await
            .map_err(|source| {
                warn!(index, filename = %attachment.filename, error = %source, "Image upload failed");
                UploadError {
                    index,
                    filename: attachment.filename.clone(),
                    source,
                }
            })?;

        debug!(index, %url, "Uploaded image");
        urls.push(url);
    }

    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use std::sync::Mutex;

    /// Hands out sequential URLs and fails on one chosen call
    struct ScriptedHost {
        fail_on: Option<usize>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedHost {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageHost for ScriptedHost {
        async fn upload(&self, data_uri: String, folder: &str) -> Result<String, HostError> {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.len();
            calls.push(data_uri);
            if self.fail_on == Some(n) {
                return Err(HostError::Other("boom".to_string()));
            }
            Ok(format!("https://img.test/{folder}/{n}"))
        }

        fn host_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn attachment(name: &str, content_type: Option<&str>) -> Attachment {
        Attachment {
            filename: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(b"hi"),
        }
    }

    #[test]
    fn data_uri_uses_part_content_type() {
        let uri = data_uri(&attachment("a.jpg", Some("image/jpeg")));
        assert_eq!(uri, "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn data_uri_falls_back_to_png() {
        assert_eq!(data_uri(&attachment("a", None)), "data:image/png;base64,aGk=");
        assert_eq!(data_uri(&attachment("a", Some(""))), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn no_attachments_is_a_no_op() {
        let host = ScriptedHost::new(Some(0));
        let urls = upload_all(&host, "listings", &[]).await.unwrap();

        assert!(urls.is_empty());
        assert!(host.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn urls_follow_attachment_order() {
        let host = ScriptedHost::new(None);
        let attachments = [attachment("one.png", None), attachment("two.png", None)];

        let urls = upload_all(&host, "listings", &attachments).await.unwrap();

        assert_eq!(urls, ["https://img.test/listings/0", "https://img.test/listings/1"]);
    }

    #[tokio::test]
    async fn first_failure_stops_the_loop() {
        let host = ScriptedHost::new(Some(1));
        let attachments = [
            attachment("one.png", None),
            attachment("two.png", None),
            attachment("three.png", None),
        ];

        let err = upload_all(&host, "listings", &attachments).await.unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.filename, "two.png");
        assert_eq!(host.calls.lock().unwrap().len(), 2);
    }
}
