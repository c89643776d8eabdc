use crate::images::HostError;
use async_trait::async_trait;

/// An external image-hosting service.
/// Implementations take a base64 data URI and return the public URL of the stored image.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store one image under `folder`
    async fn upload(&self, data_uri: String, folder: &str) -> Result<String, HostError>;

    /// Name of the hosting service, for logs
    fn host_name(&self) -> &'static str;
}
