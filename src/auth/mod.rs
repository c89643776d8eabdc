pub mod google;
pub mod session;
pub mod traits;

pub use google::GoogleOAuth;
pub use session::SessionKeys;
pub use traits::{IdentityResolver, SessionUser};

use async_trait::async_trait;
use axum::http::HeaderMap;
use tracing::{debug, info, warn};

use crate::models::{NewUser, User};
use crate::store::{StoreError, UserStore};

/// Usernames taken from a provider profile are cut to this many characters
pub const MAX_USERNAME_CHARS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("session has expired")]
    TokenExpired,

    #[error("invalid session token: {0}")]
    TokenInvalid(String),

    #[error("sign-in state did not match")]
    StateMismatch,

    #[error("OAuth provider error: {0}")]
    Provider(String),

    #[error("request to OAuth provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Profile returned by the OAuth provider after consent
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Make sure a user exists for a freshly authenticated profile.
///
/// Returns the existing user when the email is already known; otherwise
/// creates one named after the profile.
pub async fn sign_in(users: &dyn UserStore, profile: &Profile) -> Result<User, StoreError> {
    if let Some(user) = users.find_by_email(&profile.email).await? {
        debug!(user_id = %user.id, "Existing user signed in");
        return Ok(user);
    }

    let username: String = profile.name.chars().take(MAX_USERNAME_CHARS).collect();
    let user = users
        .create_user(NewUser {
            email: profile.email.clone(),
            username,
            image: profile.picture.clone(),
        })
        .await?;

    info!(user_id = %user.id, "Created user on first sign-in");
    Ok(user)
}

/// Resolves a request's session token to the stored user with that email
pub struct SessionResolver<'a> {
    keys: &'a SessionKeys,
    users: &'a dyn UserStore,
}

impl<'a> SessionResolver<'a> {
    pub fn new(keys: &'a SessionKeys, users: &'a dyn UserStore) -> Self {
        Self { keys, users }
    }
}

#[async_trait]
impl<'a> IdentityResolver for SessionResolver<'a> {
    async fn resolve(&self, headers: &HeaderMap) -> Option<SessionUser> {
        let token = session::token_from_headers(headers)?;

        let claims = match self.keys.verify(&token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Rejecting session token");
                return None;
            }
        };

        match self.users.find_by_email(&claims.sub).await {
            Ok(Some(user)) => Some(SessionUser {
                user_id: user.id,
                email: user.email,
                name: user.username,
                image: user.image,
            }),
            Ok(None) => {
                warn!(email = %claims.sub, "Session refers to an unknown user");
                None
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed during session resolution");
                None
            }
        }
    }
}
