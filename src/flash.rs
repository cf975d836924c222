//! One-shot messages which survive a single redirect.
//!
//! Messages are queued in a private cookie by the handler which performs an
//! action and drained by whichever page is rendered next.

use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};

pub const FLASH_COOKIE: &str = "roadwatch_flash";

fn read(jar: &PrivateCookieJar) -> Vec<String> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

/// Longest piece of user input, in characters, echoed back in a message.
/// Browsers drop cookies over about 4 KB, and the message with them.
const MAX_ECHO: usize = 80;

/// Shortens user-supplied text for inclusion in a message.
pub fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_ECHO) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Queues `msg` for display on the next rendered page.
pub fn push(jar: PrivateCookieJar, msg: impl Into<String>) -> PrivateCookieJar {
    let mut messages = read(&jar);
    messages.push(msg.into());

    match serde_json::to_string(&messages) {
        Ok(value) => jar.add(
            Cookie::build((FLASH_COOKIE, value))
                .path("/")
                .http_only(true),
        ),
        Err(e) => {
            tracing::error!(error = %e, "could not encode flash messages");
            jar
        }
    }
}

/// Removes and returns every queued message.
pub fn take(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<String>) {
    let messages = read(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }
    (jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/")), messages)
}
