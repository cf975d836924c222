use std::fmt;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use chrono::{Days, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util_resp::flash_redirect;

pub mod accounts;
pub mod login;
pub mod register;

pub const LOGIN_COOKIE: &str = "roadwatch_session";
const SESSION_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Contractor,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "citizen" => Some(Role::Citizen),
            "contractor" => Some(Role::Contractor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Citizen => "citizen",
            Role::Contractor => "contractor",
        })
    }
}

/// The logged-in user making the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize)]
struct LoginSession {
    #[serde(flatten)]
    identity: Identity,
    expiry: NaiveDateTime,
}

impl Identity {
    /// Reads the identity stored in the session cookie, if there is a valid
    /// one which has not yet expired.
    pub fn from_jar(jar: &PrivateCookieJar) -> Option<Self> {
        let cookie = jar.get(LOGIN_COOKIE)?;
        match serde_json::from_str::<LoginSession>(cookie.value()) {
            Ok(session) if Utc::now().naive_utc() < session.expiry => {
                Some(session.identity)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});

        match Identity::from_jar(&jar) {
            Some(identity) => Ok(identity),
            None => {
                let next: String = url::form_urlencoded::byte_serialize(
                    parts.uri.path().as_bytes(),
                )
                .collect();
                Err(flash_redirect(
                    jar,
                    &format!("/login?next={next}"),
                    "Please login first.",
                )
                .into_response())
            }
        }
    }
}

pub fn set_login_cookie(
    identity: Identity,
    jar: PrivateCookieJar,
) -> PrivateCookieJar {
    let expiry = Utc::now()
        .naive_utc()
        .checked_add_days(Days::new(SESSION_DAYS))
        .unwrap_or(NaiveDateTime::MAX);

    match serde_json::to_string(&LoginSession { identity, expiry }) {
        Ok(value) => jar.add(
            Cookie::build((LOGIN_COOKIE, value))
                .path("/")
                .http_only(true),
        ),
        Err(e) => {
            tracing::error!(error = %e, "could not encode login session");
            jar
        }
    }
}

pub fn clear_login_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build((LOGIN_COOKIE, "")).path("/"))
}

/// Hashes a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// Checks `password` against a stored PHC string. Stored values which are
/// not valid hashes (for example legacy plaintext) never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password is not a valid hash");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verify() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("hunter22", &a));
        assert!(verify_password("hunter22", &b));
        assert!(!verify_password("hunter23", &a));
    }

    #[test]
    fn plaintext_never_verifies() {
        assert!(!verify_password("password123", "password123"));
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::parse("citizen"), Some(Role::Citizen));
        assert_eq!(Role::parse("contractor"), Some(Role::Contractor));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::Contractor.to_string(), "contractor");
    }

    #[test]
    fn session_round_trips_through_private_cookie() {
        let key = Key::from(&[b'0'; 64][..]);
        let jar = PrivateCookieJar::new(key);
        let identity = Identity {
            username: "john_j".into(),
            role: Role::Citizen,
        };

        let jar = set_login_cookie(identity.clone(), jar);
        assert_eq!(Identity::from_jar(&jar), Some(identity));

        let jar = clear_login_cookie(jar);
        assert_eq!(Identity::from_jar(&jar), None);
    }
}
