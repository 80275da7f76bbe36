//! Authentication strategies
//!
//! Two named verification procedures: signup (create-if-absent) and login
//! (verify-if-present). Each invocation resolves to exactly one terminal
//! outcome; there is no path that neither accepts nor rejects.

use portero_shared::User;

use crate::{
    auth::password::{hash_password, verify_password, PasswordError},
    store::{InsertOutcome, StoreError, UserStore},
};

/// Why a login attempt was rejected.
///
/// Distinguished internally for logging; user-facing responses must never
/// reveal which field was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoSuchUser,
    BadPassword,
}

/// Terminal outcome of a login attempt
#[derive(Debug)]
pub enum LoginOutcome {
    Accepted(User),
    Rejected(RejectReason),
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error(transparent)]
    Hashing(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Signup strategy: create the account unless the username is taken.
///
/// The store's insert-if-absent primitive is the only uniqueness check, so
/// two concurrent signups for the same username cannot both create an
/// account. On conflict nothing is written and the creation step is never
/// reached.
pub async fn signup(
    store: &dyn UserStore,
    name: &str,
    username: &str,
    password: &str,
) -> Result<User, SignupError> {
    let password_hash = hash_password(password)?;

    match store
        .insert_if_absent(name, username, &password_hash)
        .await?
    {
        InsertOutcome::Inserted(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "account created");
            Ok(user)
        }
        InsertOutcome::Conflict => {
            tracing::warn!(username = %username, "signup rejected: username taken");
            Err(SignupError::DuplicateUsername)
        }
    }
}

/// Login strategy: verify the password of an existing account.
///
/// Always resolves to `Accepted` or `Rejected`; a wrong password is a
/// rejection, not a hang, and a corrupt stored hash verifies as false.
pub async fn login(
    store: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, StoreError> {
    let Some(user) = store.find_by_username(username).await? else {
        tracing::warn!(username = %username, "login rejected: unknown user");
        return Ok(LoginOutcome::Rejected(RejectReason::NoSuchUser));
    };

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(user_id = %user.id, "login rejected: wrong password");
        return Ok(LoginOutcome::Rejected(RejectReason::BadPassword));
    }

    tracing::info!(user_id = %user.id, "login accepted");
    Ok(LoginOutcome::Accepted(user))
}
