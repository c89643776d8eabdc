use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, session, AuthError, IdentityResolver};
use crate::error::ApiError;
use crate::models::Property;
use crate::state::AppState;
use crate::store::PropertyStore;

const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_TTL_SECS: u64 = 600;

/// `GET /api/properties`
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = state.db.list_all().await?;
    Ok(Json(properties))
}

/// `GET /api/properties/{id}`
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Property>, ApiError> {
    state
        .db
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Property"))
}

/// `POST /api/properties`: run the submission pipeline and redirect to the
/// new listing's page.
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let identity = state.identity();

    match state.pipeline(&identity).submit(&headers, multipart).await {
        Ok(submitted) => Redirect::to(&submitted.location).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /api/auth/session`: the signed-in user, or an empty object
pub async fn current_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    match state.identity().resolve(&headers).await {
        Some(user) => Json(json!({ "user": user })),
        None => Json(json!({})),
    }
}

/// `GET /api/auth/signin/google`
pub async fn google_sign_in(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let csrf = Uuid::new_v4().to_string();
    let cookie = session::set_cookie(
        OAUTH_STATE_COOKIE,
        &csrf,
        OAUTH_STATE_TTL_SECS,
        state.secure_cookies(),
    );

    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Redirect::to(&state.google.authorize_url(&csrf)),
    )
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: String,
    state: String,
}

/// `GET /api/auth/callback/google`
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let expected = session::cookie_value(&headers, OAUTH_STATE_COOKIE);
    if expected.as_deref() != Some(params.state.as_str()) {
        warn!("OAuth callback state did not match");
        return Err(AuthError::StateMismatch.into());
    }

    let profile = state.google.exchange(&params.code).await?;
    let user = auth::sign_in(&state.db, &profile)
        .await
        .map_err(AuthError::from)?;
    let token = state
        .sessions
        .issue(&user.email, &user.username, user.image.as_deref())?;

    info!(user_id = %user.id, "Signed in");

    let cookies = [
        (
            SET_COOKIE,
            session::set_cookie(
                session::SESSION_COOKIE,
                &token,
                state.sessions.ttl_secs(),
                state.secure_cookies(),
            ),
        ),
        (SET_COOKIE, session::clear_cookie(OAUTH_STATE_COOKIE)),
    ];

    Ok((
        AppendHeaders(cookies),
        Redirect::to(&format!("{}/", state.config.public_base_url)),
    ))
}

/// `POST /api/auth/signout`
pub async fn sign_out(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, session::clear_cookie(session::SESSION_COOKIE))]),
        Redirect::to(&format!("{}/", state.config.public_base_url)),
    )
}
