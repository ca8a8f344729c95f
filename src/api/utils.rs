use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "chatrelay_session";

/// Get the caller's session ID from the session cookie, minting a
/// new one when it's missing. The returned jar must be sent back with
/// the response so a new cookie sticks.
pub fn session_id(jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4().to_string();
    tracing::debug!("Starting new session {}", id);
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), id)
}
