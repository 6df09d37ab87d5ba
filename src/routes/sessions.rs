use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use log::debug;

use super::{error::ApiError, form};
use crate::model::{AppState, User};

#[derive(Default, serde::Deserialize)]
#[serde(default)]
pub struct Credentials {
    email: String,
    /// The (**unhashed**) password
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't print the password
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish()
    }
}

#[debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let credentials = form::json_or_default(payload)?;
    debug!("Got login request: {:?}", credentials);

    let user = state
        .users
        .verify_credentials(&credentials.email, &credentials.password)
        .await
        .map_err(|err| ApiError::from_repo(err, "Error logging in", StatusCode::INTERNAL_SERVER_ERROR))?;

    debug!("Logged in user {}", user.id);
    Ok(Json(user))
}
