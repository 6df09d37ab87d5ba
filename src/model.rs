pub mod database;
pub mod object_id;
pub mod repository;
pub mod user;

pub use database::{DocumentStore, SqliteStore};
pub use object_id::ObjectId;
pub use repository::UserRepository;
pub use user::{FriendRef, Post, User};

use crate::upload::ImageStore;

pub struct AppState {
    pub users: UserRepository,
    pub images: ImageStore,
    /// Shared secret checked by [`crate::auth::guard`].
    pub auth_secret: String,
    /// Largest request body accepted, uploads included.
    pub body_limit: usize,
}

impl AppState {
    pub fn new(
        store: Box<dyn DocumentStore>,
        images: ImageStore,
        auth_secret: String,
        body_limit: usize,
    ) -> AppState {
        AppState {
            users: UserRepository::new(store),
            images,
            auth_secret,
            body_limit,
        }
    }
}
