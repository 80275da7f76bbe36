//! Common types used across Portero

use serde::Deserialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// An account, as persisted by the user store.
///
/// `username` is the unique lookup key and is never changed after signup.
/// `password_hash` holds the PHC-encoded hash, never the plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Login form fields as submitted by the browser
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Signup form fields as submitted by the browser
#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub username: String,
    pub password: String,
}
