use axum::{
    extract::{Form, Query, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{
        Identity, Role,
        accounts::{LoginError, authenticate},
        clear_login_cookie, set_login_cookie,
    },
    flash,
    state::AppState,
    template::Page,
    util_resp::{StandardResponse, flash_redirect_ok, see_other_ok, success},
};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginQuery {
    next: Option<String>,
}

/// Only ever redirect to a path on this site, whatever `next` contains.
fn local_redirect(next: Option<&str>) -> String {
    let Some(next) = next.filter(|n| !n.is_empty()) else {
        return "/dashboard".to_string();
    };
    Url::parse("http://localhost")
        .and_then(|base| base.join(next))
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| "/dashboard".to_string())
}

fn login_path(next: Option<&str>) -> String {
    match next {
        Some(next) => {
            let next: String =
                url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
            format!("/login?next={next}")
        }
        None => "/login".to_string(),
    }
}

pub async fn login_page(
    identity: Option<Identity>,
    jar: PrivateCookieJar,
    Query(query): Query<LoginQuery>,
) -> StandardResponse {
    if identity.is_some() {
        return see_other_ok(jar, Redirect::to("/dashboard"));
    }

    let (jar, flashes) = flash::take(jar);
    let action = login_path(query.next.as_deref());

    success(
        jar,
        Page::new()
            .title("Login")
            .flashes(flashes)
            .body(maud! {
                h1 { "Login" }
                form method="post" action=(action) class="mt-4" {
                    div class="mb-3" {
                        label for="user_type" class="form-label" { "I am a" }
                        select class="form-select" id="user_type" name="user_type" {
                            option value="citizen" selected { "Citizen" }
                            option value="contractor" { "Contractor" }
                        }
                    }
                    div class="mb-3" {
                        label for="username" class="form-label" { "Username or email" }
                        input type="text" class="form-control" id="username" name="username" required;
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password" required;
                    }
                    button type="submit" class="btn btn-primary" { "Login" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    user_type: String,
    username: String,
    password: String,
}

pub async fn do_login(
    identity: Option<Identity>,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> StandardResponse {
    if identity.is_some() {
        return see_other_ok(jar, Redirect::to("/dashboard"));
    }

    let back = login_path(query.next.as_deref());

    if form.user_type.trim().is_empty()
        || form.username.trim().is_empty()
        || form.password.trim().is_empty()
    {
        return flash_redirect_ok(
            jar,
            &back,
            "Please enter all required fields.",
        );
    }
    let Some(role) = Role::parse(form.user_type.trim()) else {
        return flash_redirect_ok(jar, &back, "Invalid user type.");
    };

    match authenticate(&state.store, role, &form.username, &form.password) {
        Ok((identity, name)) => {
            let jar = set_login_cookie(identity, jar);
            flash_redirect_ok(
                jar,
                &local_redirect(query.next.as_deref()),
                format!("Welcome {}!", flash::excerpt(&name)),
            )
        }
        Err(LoginError::MissingFields) => flash_redirect_ok(
            jar,
            &back,
            "Please enter all required fields.",
        ),
        Err(LoginError::NoSuchUser) => flash_redirect_ok(
            jar,
            &back,
            "No user found with that username or email.",
        ),
        Err(LoginError::WrongPassword) => flash_redirect_ok(
            jar,
            &back,
            "Incorrect password. Please try again.",
        ),
    }
}

pub async fn logout(jar: PrivateCookieJar) -> StandardResponse {
    flash_redirect_ok(
        clear_login_cookie(jar),
        "/login",
        "You have been logged out.",
    )
}

#[cfg(test)]
mod tests {
    use super::local_redirect;

    #[test]
    fn next_is_confined_to_this_site() {
        assert_eq!(local_redirect(None), "/dashboard");
        assert_eq!(local_redirect(Some("")), "/dashboard");
        assert_eq!(local_redirect(Some("/report")), "/report");
        assert_eq!(local_redirect(Some("https://evil.example/steal")), "/steal");
        assert_eq!(local_redirect(Some("//evil.example/x")), "/x");
    }
}
