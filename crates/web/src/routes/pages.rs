//! Server-rendered page handlers

use axum::{extract::Extension, response::Html};

use crate::{auth::Session, views};

/// GET /
pub async fn home() -> Html<String> {
    Html(views::home())
}

/// GET /login
pub async fn login() -> Html<String> {
    Html(views::login())
}

/// GET /signup
pub async fn signup() -> Html<String> {
    Html(views::signup())
}

/// GET /missingpermission
pub async fn missing_permission() -> Html<String> {
    Html(views::missing_permission())
}

/// GET /perfil (guarded)
pub async fn perfil(Extension(session): Extension<Session>) -> Html<String> {
    Html(views::perfil(&session.username))
}

/// GET /logout (guarded): logout confirmation page
pub async fn logout(Extension(session): Extension<Session>) -> Html<String> {
    Html(views::logout(&session.username))
}

/// GET /info: process facts page
pub async fn info() -> Html<String> {
    Html(views::info(&process_facts()))
}

fn process_facts() -> Vec<(String, String)> {
    vec![
        ("platform".to_string(), std::env::consts::OS.to_string()),
        ("pid".to_string(), std::process::id().to_string()),
        (
            "version".to_string(),
            format!("portero {}", env!("CARGO_PKG_VERSION")),
        ),
        (
            "cwd".to_string(),
            std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
        ),
        (
            "args".to_string(),
            std::env::args().collect::<Vec<_>>().join(" "),
        ),
    ]
}
