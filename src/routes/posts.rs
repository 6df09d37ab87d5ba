use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;

use super::{error::ApiError, form};
use crate::model::{repository::NewPost, AppState, Post};

#[debug_handler]
pub async fn add_post(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let mut form = form::read(multipart, &state.images).await?;

    // The image URL comes from this request's own upload.
    let new_post = NewPost {
        title: form.take("title"),
        post: form.take("post"),
        image: form.image.map(|image| image.url),
    };

    let post = state
        .users
        .append_post(&user_id, new_post)
        .await
        .map_err(|err| {
            ApiError::from_repo(err, "Error creating post", StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok((StatusCode::CREATED, Json(post)))
}
