use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_macros::debug_handler;
use log::debug;

use super::{error::ApiError, form};
use crate::model::AppState;

/// Missing ids, and bodies that aren't a JSON object of strings, end up as
/// empty strings, which then fail id validation.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddFriend {
    pub user_id: String,
    pub friend_id: String,
}

#[derive(Debug, serde::Serialize)]
pub struct Message {
    pub message: &'static str,
}

#[debug_handler]
pub async fn add_friend(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddFriend>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let body = form::json_or_default(payload)?;
    debug!("Linking {:?} and {:?}", body.user_id, body.friend_id);

    state
        .users
        .link_friends(&body.user_id, &body.friend_id)
        .await
        .map_err(|err| {
            ApiError::from_repo(err, "Error adding friend", StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(Message {
        message: "Friend added successfully",
    }))
}
