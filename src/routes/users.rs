use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use log::debug;

use super::{error::ApiError, form};
use crate::model::{repository::NewUser, AppState, User};

#[debug_handler]
pub async fn add_user(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let mut form = form::read(multipart, &state.images).await?;

    let new_user = NewUser {
        name: form.take("name"),
        email: form.take("email"),
        password: form.take("password"),
        image: form.image.map(|image| image.url),
    };
    debug!("Got registration request for user: {}", new_user.name);

    let user = state
        .users
        .create(new_user)
        .await
        .map_err(|err| ApiError::from_repo(err, "Error creating user", StatusCode::BAD_REQUEST))?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[debug_handler]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.find_by_id(&id).await.map_err(|err| {
        ApiError::from_repo(err, "Error retrieving user", StatusCode::INTERNAL_SERVER_ERROR)
    })?;
    Ok(Json(user))
}

#[debug_handler]
pub async fn all_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.users.find_all().await.map_err(|err| {
        ApiError::from_repo(err, "Error retrieving users", StatusCode::INTERNAL_SERVER_ERROR)
    })?;
    Ok(Json(users))
}
