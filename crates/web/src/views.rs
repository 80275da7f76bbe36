//! Server-rendered views
//!
//! Pages are small HTML5 fragments; user-supplied text is escaped before
//! interpolation.

use html_escape::encode_text;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title} - Portero</title></head>\n\
         <body>\n{body}\n</body>\n\
         </html>\n"
    )
}

pub fn home() -> String {
    page(
        "Home",
        "<h1>Welcome</h1>\n\
         <p><a href=\"/login\">Log in</a> or <a href=\"/signup\">sign up</a> to continue.</p>",
    )
}

pub fn login() -> String {
    page(
        "Log in",
        "<h1>Log in</h1>\n\
         <form method=\"post\" action=\"/loginForm\">\n\
         <label>Username <input type=\"text\" name=\"username\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n\
         </form>\n\
         <p>No account? <a href=\"/signup\">Sign up</a>.</p>",
    )
}

pub fn signup() -> String {
    page(
        "Sign up",
        "<h1>Sign up</h1>\n\
         <form method=\"post\" action=\"/signupForm\">\n\
         <label>Name <input type=\"text\" name=\"name\" required></label>\n\
         <label>Username <input type=\"text\" name=\"username\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Sign up</button>\n\
         </form>\n\
         <p>Already registered? <a href=\"/login\">Log in</a>.</p>",
    )
}

pub fn missing_permission() -> String {
    page(
        "Missing permission",
        "<h1>Missing permission</h1>\n\
         <p>You must <a href=\"/login\">log in</a> to view this page.</p>",
    )
}

pub fn perfil(username: &str) -> String {
    let username = encode_text(username);
    page(
        "Profile",
        &format!(
            "<h1>Profile</h1>\n\
             <p>Logged in as <strong>{username}</strong>.</p>\n\
             <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>"
        ),
    )
}

pub fn logout(username: &str) -> String {
    let username = encode_text(username);
    page(
        "Log out",
        &format!(
            "<h1>Log out</h1>\n\
             <p>Goodbye, <strong>{username}</strong>. Confirm to end your session.</p>\n\
             <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>"
        ),
    )
}

pub fn info(facts: &[(String, String)]) -> String {
    let mut rows = String::new();
    for (key, value) in facts {
        rows.push_str(&format!(
            "<li><strong>{}</strong>: {}</li>\n",
            encode_text(key),
            encode_text(value)
        ));
    }

    page("Info", &format!("<h1>Process info</h1>\n<ul>\n{rows}</ul>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_text_is_escaped() {
        let html = perfil("<script>alert(1)</script>");

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn forms_post_to_their_endpoints() {
        assert!(login().contains("action=\"/loginForm\""));
        assert!(signup().contains("action=\"/signupForm\""));
        assert!(perfil("alice").contains("action=\"/logout\""));
    }

    #[test]
    fn info_lists_every_fact() {
        let facts = vec![
            ("platform".to_string(), "linux".to_string()),
            ("pid".to_string(), "42".to_string()),
        ];
        let html = info(&facts);

        assert!(html.contains("platform"));
        assert!(html.contains("42"));
    }
}
