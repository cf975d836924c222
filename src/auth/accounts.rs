//! Citizen and contractor accounts.

use serde::{Deserialize, Serialize};

use crate::{
    auth::{Identity, Role, hash_password, verify_password},
    store::{Record, Store, StoreError},
    validation::is_ascii_no_spaces,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citizen {
    pub username: String,
    pub name: String,
    pub age: String,
    pub email: String,
    pub address: String,
    pub password_hash: String,
}

impl Record for Citizen {
    const FILE_NAME: &'static str = "citizens.csv";
    const HEADERS: &'static [&'static str] =
        &["username", "name", "age", "email", "address", "password_hash"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contractor {
    pub username: String,
    pub name: String,
    pub password_hash: String,
}

impl Record for Contractor {
    const FILE_NAME: &'static str = "contractors.csv";
    const HEADERS: &'static [&'static str] =
        &["username", "name", "password_hash"];
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("required fields are missing")]
    MissingFields,
    #[error("username {0}")]
    InvalidUsername(String),
    #[error("username is already taken")]
    Duplicate,
    #[error("could not hash password: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("required fields are missing")]
    MissingFields,
    #[error("no such user")]
    NoSuchUser,
    #[error("incorrect password")]
    WrongPassword,
}

/// Submitted citizen details. Values are trimmed before use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCitizen {
    pub name: String,
    pub age: String,
    pub email: String,
    pub address: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewContractor {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// The username a citizen would get if nobody else had it yet: the first
/// word of their name in lower case, then the local part of their email.
fn base_username(name: &str, email: &str) -> String {
    let first = name.split_whitespace().next().unwrap_or("").to_lowercase();
    let local = email.split_once('@').map_or(email, |(local, _)| local);
    format!("{first}_{local}")
}

fn unique_username(base: &str, taken: &[Citizen]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|c| c.username == candidate);

    if !is_taken(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|i| format!("{base}{i}"))
        .find(|candidate| !is_taken(candidate.as_str()))
        .unwrap_or_else(|| unreachable!("the suffix space is unbounded"))
}

impl Citizen {
    /// Registers a citizen and returns their generated username.
    pub fn register(
        store: &Store,
        form: NewCitizen,
    ) -> Result<String, RegisterError> {
        let name = form.name.trim();
        let email = form.email.trim();
        let password = form.password.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(RegisterError::MissingFields);
        }

        let password_hash =
            hash_password(password).map_err(RegisterError::Hash)?;
        let base = base_username(name, email);

        let username = store.citizens.modify(|citizens| {
            let username = unique_username(&base, citizens);
            citizens.push(Citizen {
                username: username.clone(),
                name: name.to_string(),
                age: form.age.trim().to_string(),
                email: email.to_string(),
                address: form.address.trim().to_string(),
                password_hash,
            });
            Ok::<_, RegisterError>(username)
        })?;

        tracing::info!(%username, "registered citizen");
        Ok(username)
    }
}

impl Contractor {
    /// Registers a contractor under the username they chose.
    pub fn register(
        store: &Store,
        form: NewContractor,
    ) -> Result<String, RegisterError> {
        let name = form.name.trim();
        let username = form.username.trim();
        let password = form.password.trim();
        if name.is_empty() || username.is_empty() || password.is_empty() {
            return Err(RegisterError::MissingFields);
        }
        is_ascii_no_spaces(username).map_err(RegisterError::InvalidUsername)?;

        // checked again under the table lock below
        if store.contractors.load().iter().any(|c| c.username == username) {
            return Err(RegisterError::Duplicate);
        }
        let password_hash =
            hash_password(password).map_err(RegisterError::Hash)?;

        store.contractors.modify(|contractors| {
            if contractors.iter().any(|c| c.username == username) {
                return Err(RegisterError::Duplicate);
            }
            contractors.push(Contractor {
                username: username.to_string(),
                name: name.to_string(),
                password_hash,
            });
            Ok(())
        })?;

        tracing::info!(%username, "registered contractor");
        Ok(username.to_string())
    }

    pub fn find(store: &Store, username: &str) -> Option<Contractor> {
        store
            .contractors
            .load()
            .into_iter()
            .find(|c| c.username == username)
    }
}

/// Checks a set of credentials, returning the identity and display name of
/// the matching account.
///
/// Citizens may log in with either their username or their email address;
/// contractors only with their username.
pub fn authenticate(
    store: &Store,
    role: Role,
    id: &str,
    password: &str,
) -> Result<(Identity, String), LoginError> {
    let id = id.trim();
    let password = password.trim();
    if id.is_empty() || password.is_empty() {
        return Err(LoginError::MissingFields);
    }

    let (username, name, hash) = match role {
        Role::Citizen => {
            let citizens = store.citizens.load();
            let found = citizens
                .iter()
                .find(|c| c.username == id)
                .or_else(|| citizens.iter().find(|c| c.email == id))
                .ok_or(LoginError::NoSuchUser)?;
            (
                found.username.clone(),
                found.name.clone(),
                found.password_hash.clone(),
            )
        }
        Role::Contractor => {
            let found =
                Contractor::find(store, id).ok_or(LoginError::NoSuchUser)?;
            (found.username, found.name, found.password_hash)
        }
    };

    if !verify_password(password, &hash) {
        tracing::info!(%username, %role, "failed login");
        return Err(LoginError::WrongPassword);
    }

    tracing::info!(%username, %role, "logged in");
    Ok((Identity { username, role }, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::temp_data_dir;

    fn citizen(name: &str, email: &str) -> NewCitizen {
        NewCitizen {
            name: name.into(),
            age: "34".into(),
            email: email.into(),
            address: "12 High Street".into(),
            password: "secret1".into(),
        }
    }

    #[test]
    fn username_generation() {
        assert_eq!(base_username("John Smith", "j@x.com"), "john_j");
        assert_eq!(base_username("  Ada  ", "Ada.L@x.com"), "ada_Ada.L");
        assert_eq!(base_username("Bob", "no-at-sign"), "bob_no-at-sign");
    }

    #[test]
    fn colliding_citizens_get_suffixes() {
        let store = Store::open(&temp_data_dir()).unwrap();

        let first = Citizen::register(&store, citizen("John Smith", "j@x.com"));
        let second =
            Citizen::register(&store, citizen("John Smith", "j@x.com"));
        let third = Citizen::register(&store, citizen("john", "j@y.org"));

        assert_eq!(first.unwrap(), "john_j");
        assert_eq!(second.unwrap(), "john_j1");
        assert_eq!(third.unwrap(), "john_j2");
        assert_eq!(store.citizens.load().len(), 3);
    }

    #[test]
    fn citizen_requires_name_email_and_password() {
        let store = Store::open(&temp_data_dir()).unwrap();
        let mut form = citizen("John Smith", "j@x.com");
        form.password = "   ".into();

        assert!(matches!(
            Citizen::register(&store, form),
            Err(RegisterError::MissingFields)
        ));
        assert!(store.citizens.load().is_empty());
    }

    #[test]
    fn passwords_are_not_stored_in_plaintext() {
        let store = Store::open(&temp_data_dir()).unwrap();
        Citizen::register(&store, citizen("John Smith", "j@x.com")).unwrap();

        let stored = &store.citizens.load()[0];
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn duplicate_contractor_is_rejected() {
        let store = Store::open(&temp_data_dir()).unwrap();
        let before = store.contractors.load().len();

        let res = Contractor::register(
            &store,
            NewContractor {
                name: "Another ABC".into(),
                username: "abc".into(),
                password: "pw".into(),
            },
        );

        assert!(matches!(res, Err(RegisterError::Duplicate)));
        assert_eq!(store.contractors.load().len(), before);
    }

    #[test]
    fn contractor_username_must_not_contain_spaces() {
        let store = Store::open(&temp_data_dir()).unwrap();
        let res = Contractor::register(
            &store,
            NewContractor {
                name: "Road Co".into(),
                username: "road co".into(),
                password: "pw".into(),
            },
        );
        assert!(matches!(res, Err(RegisterError::InvalidUsername(_))));
    }

    #[test]
    fn login_by_username_or_email() {
        let store = Store::open(&temp_data_dir()).unwrap();
        Citizen::register(&store, citizen("John Smith", "j@x.com")).unwrap();

        let (identity, name) =
            authenticate(&store, Role::Citizen, "john_j", " secret1 ").unwrap();
        assert_eq!(identity.username, "john_j");
        assert_eq!(identity.role, Role::Citizen);
        assert_eq!(name, "John Smith");

        let (identity, _) =
            authenticate(&store, Role::Citizen, "j@x.com", "secret1").unwrap();
        assert_eq!(identity.username, "john_j");

        assert_eq!(
            authenticate(&store, Role::Citizen, "john_j", "wrong"),
            Err(LoginError::WrongPassword)
        );
        assert_eq!(
            authenticate(&store, Role::Citizen, "nobody", "secret1"),
            Err(LoginError::NoSuchUser)
        );
        assert_eq!(
            authenticate(&store, Role::Citizen, "", "secret1"),
            Err(LoginError::MissingFields)
        );
    }

    #[test]
    fn roles_use_separate_tables() {
        let store = Store::open(&temp_data_dir()).unwrap();

        let (identity, name) =
            authenticate(&store, Role::Contractor, "abc", "password123")
                .unwrap();
        assert_eq!(identity.role, Role::Contractor);
        assert_eq!(name, "ABC Constructions");

        assert_eq!(
            authenticate(&store, Role::Citizen, "abc", "password123"),
            Err(LoginError::NoSuchUser)
        );
        assert_eq!(
            authenticate(&store, Role::Contractor, "abc", "password456"),
            Err(LoginError::WrongPassword)
        );
    }
}
