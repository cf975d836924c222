use std::{
    fs,
    path::{Path, PathBuf},
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    auth::{
        login::{do_login, login_page, logout},
        register::{
            contractor_register_page, do_contractor_register, do_register,
            register_page,
        },
    },
    dashboard::{contractor_dashboard, dashboard},
    feedback::submit::{do_submit_feedback, feedback_page},
    reports::{
        status::do_update_report_status,
        submit::{do_submit_report, report_page},
    },
    state::AppState,
    tenders::view::{do_filter_tenders, tenders_page},
};

const MIN_SECRET_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("secret_key must be at least 64 bytes long")]
    ShortSecret,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bind_address: String,
    pub data_dir: PathBuf,
    /// Served under `/static`. Defaults to `<data_dir>/static`.
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub secret_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            data_dir: PathBuf::from("data"),
            static_dir: None,
            max_upload_bytes: 10 * 1024 * 1024,
            secret_key: None,
        }
    }
}

impl Config {
    /// Reads the configuration file at `path` (if any), then applies
    /// overrides from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| {
                    ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                toml::from_str(&text)?
            }
            None => Config::default(),
        };

        Ok(config.with_env())
    }

    fn with_env(mut self) -> Self {
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            self.secret_key = Some(secret);
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            self.bind_address = addr;
        }
        self
    }

    pub fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("static"))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir().join("uploads")
    }

    /// The key used to encrypt and sign cookies. Without a configured secret
    /// a random key is generated, which means sessions end on restart.
    pub fn key(&self) -> Result<Key, ConfigError> {
        match &self.secret_key {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => {
                Ok(Key::from(secret.as_bytes()))
            }
            Some(_) => Err(ConfigError::ShortSecret),
            None => {
                tracing::warn!(
                    "no secret_key configured; generating one, sessions \
                     will not survive a restart"
                );
                Ok(Key::generate())
            }
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.static_dir();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/register", get(register_page).post(do_register))
        .route(
            "/contractor_register",
            get(contractor_register_page).post(do_contractor_register),
        )
        .route("/login", get(login_page).post(do_login))
        .route("/logout", get(logout))
        .route("/dashboard", get(dashboard))
        .route("/contractor_dashboard", get(contractor_dashboard))
        .route(
            "/update_report_status/:report_id",
            post(do_update_report_status),
        )
        .route("/tenders", get(tenders_page).post(do_filter_tenders))
        .route("/report", get(report_page).post(do_submit_report))
        .route("/feedback", get(feedback_page).post(do_submit_feedback))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            bind_address = "0.0.0.0:8080"
            data_dir = "/var/lib/roadwatch"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(
            config.upload_dir(),
            PathBuf::from("/var/lib/roadwatch/static/uploads")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("bind = \"x\"").is_err());
    }

    #[test]
    fn short_secrets_are_rejected() {
        let config = Config {
            secret_key: Some("too short".into()),
            ..Default::default()
        };
        assert!(matches!(config.key(), Err(ConfigError::ShortSecret)));

        let config = Config {
            secret_key: Some("0".repeat(64)),
            ..Default::default()
        };
        assert!(config.key().is_ok());
    }
}
