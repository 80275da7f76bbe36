//! Session middleware and route guard

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{auth::session::Session, error::WebError, state::AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "portero_session";

/// Extract the session cookie value from a Cookie header
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            for cookie in cookies.split(';') {
                let cookie = cookie.trim();
                if let Some((name, value)) = cookie.split_once('=') {
                    if name == SESSION_COOKIE {
                        return Some(value.to_string());
                    }
                }
            }
            None
        })
}

/// Guard decision: `true` iff the caller holds an authenticated session
pub fn authorize(session: Option<&Session>) -> bool {
    matches!(session, Some(session) if session.is_auth)
}

/// Middleware that restores the session (if any) into request extensions.
///
/// Runs on every request, before any guard; handlers and the guard read the
/// session from extensions instead of ambient state.
pub async fn restore_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie_value) = session_cookie(request.headers()) {
        match state.sessions.restore(&cookie_value).await {
            Ok(Some(session)) => {
                request.extensions_mut().insert(session);
            }
            Ok(None) => {}
            Err(err) => {
                // A store outage must not turn every request into a 500;
                // the caller just proceeds unauthenticated
                tracing::error!(error = %err, "failed to restore session");
            }
        }
    }

    next.run(request).await
}

/// Middleware that requires an authenticated session.
///
/// Denied requests are redirected to the missing-permission page. The
/// session only proves the user existed at login time, so the guard
/// re-checks existence: a session whose user is gone is destroyed and
/// denied.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let session = request.extensions().get::<Session>().cloned();
    if !authorize(session.as_ref()) {
        tracing::warn!(path = %path, "access denied: no authenticated session");
        return WebError::Unauthorized.into_response();
    }

    if let Some(session) = session {
        match state.users.find_by_id(session.user_id).await {
            Ok(Some(_)) => return next.run(request).await,
            Ok(None) => {
                tracing::warn!(
                    path = %path,
                    user_id = %session.user_id,
                    "access denied: session user no longer exists"
                );
                if let Some(cookie_value) = session_cookie(request.headers()) {
                    if let Err(err) = state.sessions.destroy(&cookie_value).await {
                        tracing::error!(error = %err, "failed to destroy dangling session");
                    }
                }
                return WebError::Unauthorized.into_response();
            }
            Err(err) => return WebError::from(err).into_response(),
        }
    }

    WebError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn session(is_auth: bool) -> Session {
        Session {
            is_auth,
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn authorize_allows_authenticated_sessions_only() {
        assert!(!authorize(None));

        let unauthenticated = session(false);
        assert!(!authorize(Some(&unauthenticated)));

        let authenticated = session(true);
        assert!(authorize(Some(&authenticated)));
    }

    #[test]
    fn session_cookie_is_extracted_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; portero_session=abc123; theme=dark"),
        );

        assert_eq!(session_cookie(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(session_cookie(&headers), None);
    }
}
