use log::{debug, info, trace};
use tokio::sync::Mutex;

use super::{
    database::{DocumentStore, StoreError},
    user::DEFAULT_IMAGE,
    ObjectId, Post, User,
};
use crate::auth::hash;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    ValidationFailed(&'static str),
    #[error("Invalid User ID format")]
    InvalidIdFormat,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Persistence(#[from] StoreError),
    #[error("{0}")]
    Hashing(hash::Error),
}

pub type Result<T> = std::result::Result<T, RepoError>;

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: Option<String>,
}

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub post: String,
    pub image: Option<String>,
}

/// Create/find/update operations on user documents.
///
/// The store sits behind one lock, and every operation holds it from its
/// first read to its last write, so read-modify-write sequences on the same
/// document never interleave.
pub struct UserRepository {
    store: Mutex<Box<dyn DocumentStore>>,
}

impl UserRepository {
    pub fn new(store: Box<dyn DocumentStore>) -> UserRepository {
        UserRepository {
            store: Mutex::new(store),
        }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        if new_user.name.is_empty() || new_user.email.is_empty() || new_user.password.is_empty() {
            return Err(RepoError::ValidationFailed(
                "Name, email, and password are required",
            ));
        }

        let user = User {
            id: ObjectId::new(),
            name: new_user.name,
            email: new_user.email,
            password: hash::hash_password(&new_user.password).map_err(RepoError::Hashing)?,
            image: new_user.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            posts: Vec::new(),
            friends: Vec::new(),
        };

        self.store.lock().await.insert(&user)?;
        info!("Created user {} ({})", user.id, user.name);

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<User> {
        let id = parse_id(id)?;
        let store = self.store.lock().await;
        store
            .find(&id)?
            .ok_or(RepoError::NotFound("No User Found"))
    }

    /// Every user, oldest first. An empty collection is reported as
    /// [`RepoError::NotFound`] rather than an empty list.
    pub async fn find_all(&self) -> Result<Vec<User>> {
        let users = self.store.lock().await.find_all()?;
        if users.is_empty() {
            debug!("No users in the store");
            return Err(RepoError::NotFound("No Users Found"));
        }
        Ok(users)
    }

    pub async fn append_post(&self, user_id: &str, new_post: NewPost) -> Result<Post> {
        if new_post.title.is_empty() || new_post.post.is_empty() {
            return Err(RepoError::ValidationFailed("Title and post are required"));
        }
        let user_id = parse_id(user_id)?;

        let mut store = self.store.lock().await;
        let mut user = store
            .find(&user_id)?
            .ok_or(RepoError::NotFound("No User Found"))?;

        let post = Post {
            id: ObjectId::new(),
            title: new_post.title,
            post: new_post.post,
            image: new_post.image,
            comments: Vec::new(),
            likes: Vec::new(),
        };
        user.posts.push(post.clone());
        store.save(&user)?;

        debug!("User {} now has {} posts", user.id, user.posts.len());

        Ok(post)
    }

    /// Make two users friends with each other. Calling it again for the same
    /// pair changes nothing.
    pub async fn link_friends(&self, user_id: &str, friend_id: &str) -> Result<()> {
        let friend_id = parse_id(friend_id)?;
        let user_id = parse_id(user_id)?;

        let mut store = self.store.lock().await;
        let friend = store.find(&friend_id)?;
        let user = store.find(&user_id)?;
        let (Some(mut friend), Some(mut user)) = (friend, user) else {
            return Err(RepoError::NotFound("User or Friend not found"));
        };

        if user.id == friend.id {
            let this = user.clone();
            if user.befriend(&this) {
                store.save(&user)?;
            }
            return Ok(());
        }

        let user_changed = user.befriend(&friend);
        let friend_changed = friend.befriend(&user);
        if !user_changed && !friend_changed {
            trace!("{} and {} were already friends", user.id, friend.id);
            return Ok(());
        }

        store.save_all(&[&user, &friend])?;
        info!("Linked friends {} and {}", user.id, friend.id);

        Ok(())
    }

    /// Find the user with this email whose stored hash matches `password`.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        if email.is_empty() || password.is_empty() {
            return Err(RepoError::ValidationFailed(
                "Email and password are required",
            ));
        }

        let candidates = self.store.lock().await.find_by_email(email)?;
        candidates
            .into_iter()
            .find(|user| hash::check_passwords(password, &user.password))
            .ok_or(RepoError::InvalidCredentials)
    }
}

fn parse_id(id: &str) -> Result<ObjectId> {
    id.parse().map_err(|_| {
        debug!("Rejected malformed id {:?}", id);
        RepoError::InvalidIdFormat
    })
}
