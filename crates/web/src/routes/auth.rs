//! Authentication form endpoints

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use portero_shared::{Credentials, SignupForm};

use crate::{
    auth::{login, session_cookie, signup, LoginOutcome, SignupError, SESSION_COOKIE},
    error::{WebError, WebResult},
    state::AppState,
};

/// POST /signupForm
///
/// A new account lands on the login page; a taken username goes back to the
/// signup form. Either way the request resolves exactly once.
pub async fn signup_form(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> WebResult<Redirect> {
    if !state.config.enable_signup {
        return Err(WebError::SignupDisabled);
    }

    match signup(
        state.users.as_ref(),
        &form.name,
        &form.username,
        &form.password,
    )
    .await
    {
        Ok(_user) => Ok(Redirect::to("/login")),
        Err(SignupError::DuplicateUsername) => Ok(Redirect::to("/signup")),
        Err(SignupError::Hashing(err)) => {
            tracing::error!(error = %err, "password hashing failed");
            Err(WebError::Internal)
        }
        Err(SignupError::Store(err)) => Err(err.into()),
    }
}

/// POST /loginForm
///
/// Accepted logins get a session cookie and land on the profile page.
/// Rejected logins go back to the login form; the response never says
/// whether the username or the password was wrong.
pub async fn login_form(
    State(state): State<AppState>,
    Form(form): Form<Credentials>,
) -> WebResult<Response> {
    match login(state.users.as_ref(), &form.username, &form.password).await? {
        LoginOutcome::Accepted(user) => {
            let cookie_value = state.sessions.create(&user).await?;
            let cookie =
                format!("{SESSION_COOKIE}={cookie_value}; Path=/; HttpOnly; SameSite=Lax");

            let mut headers = HeaderMap::new();
            headers.insert(
                SET_COOKIE,
                HeaderValue::from_str(&cookie).map_err(|_| WebError::Internal)?,
            );

            Ok((headers, Redirect::to("/perfil")).into_response())
        }
        LoginOutcome::Rejected(reason) => {
            // The reason stays internal; the browser only sees the form again
            tracing::debug!(?reason, "login rejected");
            Ok(Redirect::to("/login").into_response())
        }
    }
}

/// POST /logout
///
/// Destroys the session (idempotent) and expires the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> WebResult<Response> {
    if let Some(cookie_value) = session_cookie(&headers) {
        state.sessions.destroy(&cookie_value).await?;
    }

    let clear = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(&clear).map_err(|_| WebError::Internal)?,
    );

    Ok((response_headers, Redirect::to("/")).into_response())
}
