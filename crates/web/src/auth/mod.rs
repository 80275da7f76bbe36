//! Authentication: credential hashing, strategies, sessions, and the route guard

pub mod middleware;
pub mod password;
pub mod session;
pub mod strategy;

pub use middleware::{require_auth, restore_session, session_cookie, SESSION_COOKIE};
pub use session::{Session, SessionManager};
pub use strategy::{login, signup, LoginOutcome, SignupError};
