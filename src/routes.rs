use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::{auth, model::AppState};

pub mod error;
pub mod form;
mod friends;
mod health;
mod posts;
mod sessions;
mod users;

/// Build the full application. Which routes need the shared secret is decided
/// by [`auth::guard::PROTECTED_ROUTES`], not here.
pub fn router(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(state.images.dir());

    Router::new()
        .route("/", get(health::health))
        .route("/adduser", post(users::add_user))
        .route("/getuser/:id", get(users::get_user))
        .route("/allusers", get(users::all_users))
        .route("/addpost/:userId", post(posts::add_post))
        .route("/addFriend", post(friends::add_friend))
        .route("/login", post(sessions::login))
        .nest_service("/images", images)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::guard::guard,
        ))
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
