use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{debug, error};

use crate::model::repository::RepoError;

/// A failed request: a status and a plain-text body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> ApiError {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> ApiError {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a repository failure to a response.
    ///
    /// Store failures are reported as `"<context>: <error>"` with
    /// `store_status`, since routes disagree on whether that is a 400 or a 500.
    pub fn from_repo(err: RepoError, context: &str, store_status: StatusCode) -> ApiError {
        match err {
            RepoError::ValidationFailed(message) => ApiError::bad_request(message),
            RepoError::InvalidIdFormat => ApiError::bad_request(err.to_string()),
            RepoError::NotFound(message) => ApiError::new(StatusCode::NOT_FOUND, message),
            RepoError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, err.to_string()),
            RepoError::Persistence(_) | RepoError::Hashing(_) => {
                error!("{}: {}", context, err);
                ApiError::new(store_status, format!("{context}: {err}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Responding with {}: {}", self.status, self.message);
        (self.status, self.message).into_response()
    }
}
