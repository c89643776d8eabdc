use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::AuthError;
use crate::form::DecodeError;
use crate::images::UploadError;
use crate::pipeline::{RejectedInput, Stage};
use crate::store::StoreError;

/// Client-side problems with a submission
#[derive(Error, Debug)]
pub enum InvalidInput {
    #[error(transparent)]
    Form(#[from] DecodeError),

    #[error(transparent)]
    Rejected(#[from] RejectedInput),
}

/// Why a property submission stopped
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("no valid session")]
    Unauthorized,

    #[error(transparent)]
    UploadFailed(#[from] UploadError),

    #[error("invalid submission: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("could not store property: {0}")]
    PersistenceFailure(#[from] StoreError),

    #[error("unexpected failure while {stage}: {message}")]
    Unknown { stage: Stage, message: String },
}

impl SubmissionError {
    /// Decoding failures are the client's fault unless the body stream
    /// itself broke on our side.
    pub fn from_decode(err: DecodeError) -> Self {
        let server_side =
            matches!(&err, DecodeError::Multipart(e) if e.status().is_server_error());

        if server_side {
            SubmissionError::Unknown {
                stage: Stage::Decoding,
                message: err.to_string(),
            }
        } else {
            SubmissionError::InvalidInput(err.into())
        }
    }

    pub fn halted_at(&self) -> Stage {
        match self {
            SubmissionError::Unauthorized => Stage::Authenticating,
            SubmissionError::UploadFailed(_) => Stage::Uploading,
            SubmissionError::InvalidInput(InvalidInput::Form(_)) => Stage::Decoding,
            SubmissionError::InvalidInput(InvalidInput::Rejected(_)) => Stage::Assembling,
            SubmissionError::PersistenceFailure(_) => Stage::Persisting,
            SubmissionError::Unknown { stage, .. } => *stage,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SubmissionError::Unauthorized => StatusCode::UNAUTHORIZED,
            SubmissionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SubmissionError::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            SubmissionError::PersistenceFailure(_) | SubmissionError::Unknown { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let message = match &self {
            SubmissionError::Unauthorized => "Unauthorized".to_string(),
            SubmissionError::InvalidInput(e) => e.to_string(),
            SubmissionError::UploadFailed(_) => "Failed to upload property images".to_string(),
            SubmissionError::PersistenceFailure(_) | SubmissionError::Unknown { .. } => {
                "Failed to add property".to_string()
            }
        };

        (self.status(), message).into_response()
    }
}

/// Errors from the read and sign-in routes
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(AuthError::StateMismatch) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::TokenExpired | AuthError::TokenInvalid(_)) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Auth(AuthError::Provider(_) | AuthError::Http(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Auth(AuthError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let message = match &self {
            ApiError::NotFound(what) => format!("{what} Not Found"),
            _ if status.is_server_error() => "Something went wrong".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}
