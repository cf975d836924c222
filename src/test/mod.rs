//! End-to-end tests which drive the complete router.

use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    response::Response,
};
use tower::ServiceExt;

use crate::{
    config::{Config, create_app},
    state::AppState,
    store::temp_data_dir,
};


const BOUNDARY: &str = "roadwatch-test-boundary";

// This is a macro rather than a function so that a failing assertion points
// at the call site.
macro_rules! assert_redirects_to {
    ($response:expr, $location:expr) => {
        assert!(
            $response.status().is_redirection(),
            "expected a redirect, got {:?}",
            $response.status()
        );
        assert_eq!(crate::test::location(&$response), $location);
    };
}
pub(crate) use assert_redirects_to;

pub fn test_state() -> AppState {
    let config = Config {
        data_dir: temp_data_dir(),
        secret_key: Some("0".repeat(64)),
        ..Default::default()
    };
    let key = config.key().unwrap();
    AppState::new(config, key).unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .map(|value| value.to_str().unwrap().to_string())
        .unwrap_or_default()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

pub struct Photo<'a> {
    pub file_name: &'a str,
    pub data: &'a [u8],
}

/// A browser stand-in: keeps the cookies the app sets and sends them back.
pub struct Client {
    app: Router,
    pub state: AppState,
    pub cookies: HashMap<String, String>,
}

impl Client {
    pub fn new() -> Self {
        Self::with_state(test_state())
    }

    /// A second browser talking to the same application.
    pub fn with_state(state: AppState) -> Self {
        Self {
            app: create_app(state.clone()),
            state,
            cookies: HashMap::new(),
        }
    }

    async fn send(&mut self, request: Request) -> Response {
        let response = self.app.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap_or_default();
            let (name, value) = pair.split_once('=').unwrap();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        response
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(COOKIE, self.cookie_header())
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Follows a redirect and returns the body of the page it lands on.
    pub async fn follow(&mut self, response: Response) -> String {
        let to = location(&response);
        assert!(!to.is_empty(), "not a redirect: {:?}", response.status());
        let page = self.get(&to).await;
        assert!(
            page.status().is_success(),
            "GET {to} answered {:?}",
            page.status()
        );
        body_text(page).await
    }

    pub async fn post_form(
        &mut self,
        uri: &str,
        form: &[(&str, &str)],
    ) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(COOKIE, self.cookie_header())
            .body(Body::from(serde_urlencoded::to_string(form).unwrap()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        photo: Option<Photo<'_>>,
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(photo) = photo {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"photo\"; filename=\"{}\"\r\n\
                     Content-Type: image/jpeg\r\n\r\n",
                    photo.file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(photo.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(COOKIE, self.cookie_header())
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn login(
        &mut self,
        user_type: &str,
        username: &str,
        password: &str,
    ) -> Response {
        self.post_form(
            "/login",
            &[
                ("user_type", user_type),
                ("username", username),
                ("password", password),
            ],
        )
        .await
    }

    /// Registers a citizen and logs them in, returning their username.
    pub async fn citizen(&mut self, name: &str, email: &str) -> String {
        let response = self
            .post_form(
                "/register",
                &[
                    ("name", name),
                    ("age", "30"),
                    ("email", email),
                    ("address", "12 Hill Road"),
                    ("password", "secret"),
                ],
            )
            .await;
        assert_redirects_to!(response, "/login");

        let page = self.follow(response).await;
        let marker = "Your username is: ";
        let start = page.find(marker).unwrap() + marker.len();
        let username: String = page[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        let response = self.login("citizen", &username, "secret").await;
        assert_redirects_to!(response, "/dashboard");
        username
    }
}
