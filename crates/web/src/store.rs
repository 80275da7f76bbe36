//! User store: persistent account records
//!
//! The store exposes a single atomic insert-if-absent primitive so that
//! concurrent signups for the same username cannot both succeed; application
//! code never does a separate lookup-then-create.

use async_trait::async_trait;
use portero_shared::User;
use sqlx::PgPool;
use uuid::Uuid;

/// Error from the underlying store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Outcome of an insert-if-absent call
#[derive(Debug)]
pub enum InsertOutcome {
    /// The account was created
    Inserted(User),
    /// A user with this username already exists; nothing was written
    Conflict,
}

/// Persistent record of accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a new account unless the username is already taken.
    ///
    /// Must be atomic per username: under concurrent calls for the same new
    /// username exactly one inserts, the rest observe `Conflict`.
    async fn insert_if_absent(
        &self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<InsertOutcome, StoreError>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            SELECT id, name, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user: Option<User> = sqlx::query_as(
            r#"
            SELECT id, name, username, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_if_absent(
        &self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<InsertOutcome, StoreError> {
        // ON CONFLICT DO NOTHING turns lookup-then-create into one atomic
        // statement; the UNIQUE constraint on username is the arbiter
        let inserted: Option<User> = sqlx::query_as(
            r#"
            INSERT INTO users (name, username, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, name, username, password_hash, created_at
            "#,
        )
        .bind(name)
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(user) => InsertOutcome::Inserted(user),
            None => InsertOutcome::Conflict,
        })
    }
}

/// In-memory user store for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryUserStore {
    users: std::sync::Mutex<Vec<User>>,
}

#[cfg(test)]
impl MemoryUserStore {
    /// Simulate account deletion by an external actor
    pub fn remove_by_username(&self, username: &str) {
        self.users
            .lock()
            .unwrap()
            .retain(|u| u.username != username);
    }
}

#[cfg(test)]
#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_if_absent(
        &self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<InsertOutcome, StoreError> {
        // The lock is held for the whole check-and-insert, mirroring the
        // atomicity the UNIQUE constraint gives the Postgres store
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.username == username) {
            return Ok(InsertOutcome::Conflict);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: time::OffsetDateTime::now_utc(),
        };
        users.push(user.clone());

        Ok(InsertOutcome::Inserted(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn memory_store_find_and_insert() {
        let store = MemoryUserStore::default();

        assert!(store.find_by_username("alice").await.unwrap().is_none());

        let outcome = store.insert_if_absent("Alice", "alice", "hash").await.unwrap();
        let user = match outcome {
            InsertOutcome::Inserted(user) => user,
            InsertOutcome::Conflict => panic!("first insert must succeed"),
        };

        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_id(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = MemoryUserStore::default();
        store.insert_if_absent("Alice", "alice", "hash").await.unwrap();

        let outcome = store.insert_if_absent("Other", "alice", "hash2").await.unwrap();
        assert!(matches!(outcome, InsertOutcome::Conflict));

        // The losing insert wrote nothing
        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
    }

    #[tokio::test]
    async fn concurrent_signups_have_one_winner() {
        let store = Arc::new(MemoryUserStore::default());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_if_absent(&format!("Alice {i}"), "alice", "hash")
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut inserted = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await.unwrap() {
                InsertOutcome::Inserted(_) => inserted += 1,
                InsertOutcome::Conflict => conflicts += 1,
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn pg_store_insert_if_absent_is_atomic() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = portero_shared::create_pool(&url).await.expect("pool");
        let store = PgUserStore::new(pool);

        let username = format!("race-{}", Uuid::new_v4().simple());
        let first = store.insert_if_absent("A", &username, "hash").await.unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(_)));

        let second = store.insert_if_absent("B", &username, "hash").await.unwrap();
        assert!(matches!(second, InsertOutcome::Conflict));
    }
}
