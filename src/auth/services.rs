use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use super::dto::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Builds a fresh identity from form input. A blank name falls back to the
/// email's local part.
pub fn fabricate_user(name: Option<&str>, email: &str) -> User {
    let email = email.trim().to_lowercase();
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => email.split('@').next().unwrap_or_default().to_string(),
    };
    User {
        id: Uuid::new_v4(),
        name,
        email,
    }
}
