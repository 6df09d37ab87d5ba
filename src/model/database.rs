use super::{user, FriendRef, ObjectId, Post, User};
use log::{debug, info, trace};
use rusqlite::{
    types::{FromSql, Type},
    Connection, OptionalExtension, Row,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed embedded document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("no document with id {0}")]
    Missing(ObjectId),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A collection of user documents.
///
/// Each user is stored whole: the embedded posts and friends travel with it,
/// and `save` rewrites the entire document.
pub trait DocumentStore: Send {
    fn insert(&mut self, user: &User) -> Result<()>;
    fn find(&self, id: &user::Id) -> Result<Option<User>>;
    fn find_all(&self) -> Result<Vec<User>>;
    fn find_by_email(&self, email: &str) -> Result<Vec<User>>;
    fn save(&mut self, user: &User) -> Result<()>;
    /// Save several documents so that either all of them land or none do.
    fn save_all(&mut self, users: &[&User]) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

/// Build the database.
impl SqliteStore {
    pub fn open(path: &str) -> Result<SqliteStore> {
        let conn = Connection::open(path)?;
        trace!("Opened database connection to {}", path);
        SqliteStore::init_db(conn)
    }

    pub fn in_memory() -> Result<SqliteStore> {
        SqliteStore::init_db(Connection::open_in_memory()?)
    }

    fn init_db(conn: Connection) -> Result<SqliteStore> {
        trace!("Initializing database...");

        // posts and friends hold the embedded documents as JSON arrays
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id       TEXT PRIMARY KEY,
                name     TEXT NOT NULL,
                email    TEXT NOT NULL,
                password TEXT NOT NULL,
                image    TEXT NOT NULL,
                posts    TEXT NOT NULL,
                friends  TEXT NOT NULL
            )",
            (),
        )?;

        info!("Finished initializing database");

        Ok(SqliteStore { conn })
    }
}

impl DocumentStore for SqliteStore {
    fn insert(&mut self, user: &User) -> Result<()> {
        debug!("Adding user {} to database", user.id);
        self.conn.execute(
            "INSERT INTO users (id, name, email, password, image, posts, friends)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                user.id.to_hex(),
                user.name.as_str(),
                user.email.as_str(),
                user.password.as_str(),
                user.image.as_str(),
                serde_json::to_string(&user.posts)?,
                serde_json::to_string(&user.friends)?,
            ),
        )?;
        Ok(())
    }

    fn find(&self, id: &user::Id) -> Result<Option<User>> {
        debug!("Getting user {}", id);
        let row = self
            .conn
            .query_row(
                "SELECT * FROM users WHERE id=?1",
                (id.to_hex(),),
                read_row,
            )
            .optional()?;
        row.map(UserRow::into_user).transpose()
    }

    fn find_all(&self) -> Result<Vec<User>> {
        trace!("Getting all users");
        let mut stmt = self.conn.prepare("SELECT * FROM users ORDER BY rowid")?;
        let rows = stmt
            .query_map((), read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<User>> {
        debug!("Getting users (email: {})", email);
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM users WHERE email=?1 ORDER BY rowid")?;
        let rows = stmt
            .query_map((email,), read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    fn save(&mut self, user: &User) -> Result<()> {
        update(&self.conn, user)
    }

    fn save_all(&mut self, users: &[&User]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for user in users {
            update(&tx, user)?;
        }
        tx.commit()?;
        trace!("Committed {} documents", users.len());
        Ok(())
    }
}

/// Rewrite the whole document. `Transaction` derefs to `Connection`, so this
/// serves both plain and transactional saves.
fn update(conn: &Connection, user: &User) -> Result<()> {
    debug!("Saving user {}", user.id);
    let changed = conn.execute(
        "UPDATE users
         SET name=?2, email=?3, password=?4, image=?5, posts=?6, friends=?7
         WHERE id=?1",
        (
            user.id.to_hex(),
            user.name.as_str(),
            user.email.as_str(),
            user.password.as_str(),
            user.image.as_str(),
            serde_json::to_string(&user.posts)?,
            serde_json::to_string(&user.friends)?,
        ),
    )?;
    if changed == 0 {
        return Err(StoreError::Missing(user.id));
    }
    Ok(())
}

/// A row as it comes out of SQLite, before the embedded documents are decoded.
struct UserRow {
    id: String,
    name: String,
    email: String,
    password: String,
    image: String,
    posts: String,
    friends: String,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let id = self.id.parse::<ObjectId>().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
        })?;
        let posts: Vec<Post> = serde_json::from_str(&self.posts)?;
        let friends: Vec<FriendRef> = serde_json::from_str(&self.friends)?;

        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            image: self.image,
            posts,
            friends,
        })
    }
}

fn read_row(row: &Row) -> rusqlite::Result<UserRow> {
    trace!("Mapping db row to user");
    Ok(UserRow {
        id: column(row, 0)?,
        name: column(row, 1)?,
        email: column(row, 2)?,
        password: column(row, 3)?,
        image: column(row, 4)?,
        posts: column(row, 5)?,
        friends: column(row, 6)?,
    })
}

/// Get a column from a query result.
/// It is just a wrapper around the [`rusqlite::Row::get()`] method.
fn column<T: FromSql>(row: &Row, index: usize) -> rusqlite::Result<T> {
    row.get::<usize, T>(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::DEFAULT_IMAGE;

    fn user(name: &str) -> User {
        User {
            id: ObjectId::new(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password: "hash".to_string(),
            image: DEFAULT_IMAGE.to_string(),
            posts: Vec::new(),
            friends: Vec::new(),
        }
    }

    #[test]
    fn insert_then_find() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ann = user("ann");
        store.insert(&ann).unwrap();

        assert_eq!(store.find(&ann.id).unwrap(), Some(ann));
        assert_eq!(store.find(&ObjectId::new()).unwrap(), None);
    }

    #[test]
    fn find_all_keeps_insertion_order() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(store.find_all().unwrap().is_empty());

        let names = ["carol", "ann", "bob"];
        for name in names {
            store.insert(&user(name)).unwrap();
        }

        let found: Vec<_> = store
            .find_all()
            .unwrap()
            .into_iter()
            .map(|user| user.name)
            .collect();
        assert_eq!(found, names);
    }

    #[test]
    fn save_rewrites_embedded_documents() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut ann = user("ann");
        store.insert(&ann).unwrap();

        ann.posts.push(Post {
            id: ObjectId::new(),
            title: "hello".to_string(),
            post: "first post".to_string(),
            image: None,
            comments: Vec::new(),
            likes: vec![3],
        });
        store.save(&ann).unwrap();

        let stored = store.find(&ann.id).unwrap().unwrap();
        assert_eq!(stored.posts, ann.posts);
    }

    #[test]
    fn save_of_unknown_document_fails() {
        let mut store = SqliteStore::in_memory().unwrap();
        let ghost = user("ghost");

        assert!(matches!(store.save(&ghost), Err(StoreError::Missing(id)) if id == ghost.id));
    }

    #[test]
    fn save_all_is_all_or_nothing() {
        let mut store = SqliteStore::in_memory().unwrap();
        let mut ann = user("ann");
        store.insert(&ann).unwrap();
        let ghost = user("ghost");

        ann.name = "renamed".to_string();
        assert!(store.save_all(&[&ann, &ghost]).is_err());

        assert_eq!(store.find(&ann.id).unwrap().unwrap().name, "ann");
    }

    #[test]
    fn find_by_email_returns_every_match() {
        let mut store = SqliteStore::in_memory().unwrap();
        let first = user("ann");
        let mut second = user("bob");
        second.email = first.email.clone();
        store.insert(&first).unwrap();
        store.insert(&second).unwrap();
        store.insert(&user("carol")).unwrap();

        let found = store.find_by_email("ann@example.com").unwrap();
        assert_eq!(found.len(), 2);
    }
}
