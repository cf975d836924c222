use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

pub fn is_ascii_no_spaces(username: &str) -> Result<(), String> {
    match username.chars().all(|c| c.is_ascii() && !c.is_whitespace()) {
        true => Ok(()),
        false => Err("should be an ascii string without spaces".to_string()),
    }
}

/// Reduces a client-supplied upload name to a bare file name made of
/// `[A-Za-z0-9._-]`. Returns `None` if nothing usable is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    static UNSAFE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

    // browsers on windows may send the full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE.replace_all(base.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || Path::new(cleaned).file_stem().is_none() {
        return None;
    }
    Some(cleaned.to_string())
}
