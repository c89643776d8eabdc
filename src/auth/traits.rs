use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Serialize;

/// The authenticated requester behind a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

/// Maps an inbound request to the user it was made by.
///
/// Resolution never fails hard: a missing, expired, or unverifiable session
/// and any lookup error all come back as `None`, and callers reject.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Option<SessionUser>;
}
