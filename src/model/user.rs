use super::ObjectId;

pub type Id = ObjectId;

/// Used when a user registers without uploading an image.
pub const DEFAULT_IMAGE: &str =
    "https://w7.pngwing.com/pngs/205/731/png-transparent-default-avatar-thumbnail.png";

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    #[serde(skip)] // Don't expose the hash to clients
    pub password: String,
    pub image: String,
    pub posts: Vec<Post>,
    pub friends: Vec<FriendRef>,
}

impl User {
    pub fn has_friend(&self, id: &Id) -> bool {
        self.friends.iter().any(|friend| &friend.id == id)
    }

    /// Adds `other` to this user's friends unless already present.
    /// Returns whether anything changed.
    pub fn befriend(&mut self, other: &User) -> bool {
        if self.has_friend(&other.id) {
            return false;
        }
        self.friends.push(FriendRef::from(other));
        true
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Post {
    pub id: ObjectId,
    pub title: String,
    pub post: String,
    pub image: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Comment {
    pub id: ObjectId,
    pub comment: String,
}

/// Denormalized summary of a friend, embedded in the user document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FriendRef {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub image: String,
}

impl From<&User> for FriendRef {
    fn from(user: &User) -> Self {
        FriendRef {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: ObjectId::new(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password: "$argon2id$hash".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            posts: Vec::new(),
            friends: Vec::new(),
        }
    }

    #[test]
    fn befriend_skips_existing_friends() {
        let mut ann = user("ann");
        let bob = user("bob");

        assert!(ann.befriend(&bob));
        assert!(!ann.befriend(&bob));
        assert_eq!(ann.friends.len(), 1);
        assert_eq!(ann.friends[0].name, "bob");
    }

    #[test]
    fn json_hides_password_and_uses_mongo_style_id() {
        let ann = user("ann");
        let json = serde_json::to_value(&ann).unwrap();

        assert_eq!(json["_id"], ann.id.to_hex());
        assert!(json.get("password").is_none());
        assert_eq!(json["image"], DEFAULT_IMAGE);
    }
}
