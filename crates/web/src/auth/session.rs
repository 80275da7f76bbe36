//! Session management
//!
//! Sessions are server-side records in a shared key-value store with a
//! time-to-live, keyed by an opaque random token. The cookie handed to the
//! browser is the token plus an HMAC signature, so forged or truncated
//! cookies are rejected before any store round-trip. Session state is the
//! sole per-request authority for "is this caller logged in".

use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use portero_shared::User;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of randomness in a session token (64 hex chars on the wire)
const TOKEN_BYTES: usize = 32;
/// Hex chars of HMAC signature appended to the cookie value
const SIG_HEX_LEN: usize = 16;

/// Server-side session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// True once login succeeded; the route guard allows iff this is set
    pub is_auth: bool,
    /// The user this session was issued for (existed at login time)
    pub user_id: Uuid,
    /// Submitted username, kept for re-display
    pub username: String,
}

/// Key-value store with TTL semantics, keyed by opaque token
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(
        &self,
        token: &str,
        session: &Session,
        ttl_seconds: u64,
    ) -> Result<(), SessionError>;

    /// Expired entries behave exactly like missing ones
    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError>;

    /// Deleting a nonexistent entry is not an error
    async fn delete(&self, token: &str) -> Result<(), SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Backend(String),
    #[error("session encoding error: {0}")]
    Encoding(String),
}

impl From<redis::RedisError> for SessionError {
    fn from(err: redis::RedisError) -> Self {
        SessionError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Encoding(err.to_string())
    }
}

/// Redis-backed session store
///
/// `SET ... EX` lets Redis enforce the TTL server-side, so expiry needs no
/// sweeper task and holds across instances sharing the store.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(redis_url)?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    fn key(token: &str) -> String {
        format!("session:{token}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(
        &self,
        token: &str,
        session: &Session,
        ttl_seconds: u64,
    ) -> Result<(), SessionError> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(token), payload, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(Self::key(token)).await?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(token)).await?;
        Ok(())
    }
}

/// Issues, restores, and destroys sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    hmac_secret: Vec<u8>,
    ttl_seconds: u64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, secret: &str, ttl_seconds: u64) -> Self {
        Self {
            store,
            hmac_secret: secret.as_bytes().to_vec(),
            ttl_seconds,
        }
    }

    /// Create a session for a successfully authenticated user.
    ///
    /// Returns the signed cookie value to hand to the browser.
    pub async fn create(&self, user: &User) -> Result<String, SessionError> {
        let token = generate_token();
        let session = Session {
            is_auth: true,
            user_id: user.id,
            username: user.username.clone(),
        };

        self.store.put(&token, &session, self.ttl_seconds).await?;
        self.sign(&token)
    }

    /// Restore a session from a signed cookie value.
    ///
    /// Missing, expired, forged, and malformed cookies all behave as "no
    /// session".
    pub async fn restore(&self, cookie_value: &str) -> Result<Option<Session>, SessionError> {
        let Some(token) = self.verify_cookie(cookie_value) else {
            return Ok(None);
        };
        self.store.get(&token).await
    }

    /// Destroy the session behind a signed cookie value. Idempotent.
    pub async fn destroy(&self, cookie_value: &str) -> Result<(), SessionError> {
        if let Some(token) = self.verify_cookie(cookie_value) {
            self.store.delete(&token).await?;
        }
        Ok(())
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.hmac_secret)
            .map_err(|_| SessionError::Encoding("HMAC initialization failed".to_string()))
    }

    /// Cookie value = token + first signature bytes as hex
    fn sign(&self, token: &str) -> Result<String, SessionError> {
        let mut mac = self.mac()?;
        mac.update(token.as_bytes());
        let signature = mac.finalize().into_bytes();
        let sig_hex = hex::encode(&signature[..SIG_HEX_LEN / 2]);

        Ok(format!("{token}{sig_hex}"))
    }

    /// Recover the token from a signed cookie value.
    ///
    /// Forged, truncated, and otherwise malformed values yield `None`.
    fn verify_cookie(&self, cookie_value: &str) -> Option<String> {
        let token_len = TOKEN_BYTES * 2;
        if !cookie_value.is_ascii() || cookie_value.len() != token_len + SIG_HEX_LEN {
            return None;
        }

        let (token, provided_sig) = cookie_value.split_at(token_len);

        let mut mac = self.mac().ok()?;
        mac.update(token.as_bytes());
        let expected = mac.finalize().into_bytes();
        let expected_hex = hex::encode(&expected[..SIG_HEX_LEN / 2]);

        if constant_time_compare(provided_sig, &expected_hex) {
            Some(token.to_string())
        } else {
            None
        }
    }
}

/// Mint a fresh opaque session token
fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        // Do a dummy comparison to avoid length-based timing attacks
        let dummy = vec![0u8; a.len()];
        let _ = a.as_bytes().ct_eq(&dummy);
        return false;
    }

    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// In-memory session store with TTL, for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemorySessionStore {
    entries: std::sync::Mutex<
        std::collections::HashMap<String, (Session, std::time::Instant)>,
    >,
}

#[cfg(test)]
#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(
        &self,
        token: &str,
        session: &Session,
        ttl_seconds: u64,
    ) -> Result<(), SessionError> {
        let expires_at = std::time::Instant::now() + std::time::Duration::from_secs(ttl_seconds);
        self.entries
            .lock()
            .unwrap()
            .insert(token.to_string(), (session.clone(), expires_at));
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(token) {
            Some((_, expires_at)) if *expires_at <= std::time::Instant::now() => {
                entries.remove(token);
                Ok(None)
            }
            Some((session, _)) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), SessionError> {
        self.entries.lock().unwrap().remove(token);
        Ok(())
    }
}
