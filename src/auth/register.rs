use axum::{
    extract::{Form, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;

use crate::{
    auth::{
        Identity,
        accounts::{Citizen, Contractor, NewCitizen, NewContractor, RegisterError},
    },
    flash,
    state::AppState,
    template::Page,
    util_resp::{
        FailureResponse, StandardResponse, flash_redirect_ok, see_other_ok,
        success,
    },
};

fn registration_failed(e: RegisterError) -> FailureResponse {
    match e {
        RegisterError::Store(e) => e.into(),
        e => {
            tracing::error!(error = %e, "registration failed");
            FailureResponse::ServerError(())
        }
    }
}

pub async fn register_page(
    identity: Option<Identity>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    if identity.is_some() {
        return see_other_ok(jar, Redirect::to("/dashboard"));
    }
    let (jar, flashes) = flash::take(jar);

    success(
        jar,
        Page::new()
            .title("Register")
            .flashes(flashes)
            .body(maud! {
                h1 { "Register as a citizen" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Full name" }
                        input type="text" class="form-control" id="name" name="name" required;
                    }
                    div class="mb-3" {
                        label for="age" class="form-label" { "Age" }
                        input type="number" class="form-control" id="age" name="age" min="0";
                    }
                    div class="mb-3" {
                        label for="email" class="form-label" { "Email" }
                        input type="email" class="form-control" id="email" name="email" required;
                    }
                    div class="mb-3" {
                        label for="address" class="form-label" { "Address" }
                        input type="text" class="form-control" id="address" name="address";
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password" required;
                    }
                    button type="submit" class="btn btn-primary" { "Register" }
                }
                p class="mt-3" {
                    "Already registered? " a href="/login" { "Login" }
                }
            })
            .render(),
    )
}

pub async fn do_register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<NewCitizen>,
) -> StandardResponse {
    match Citizen::register(&state.store, form) {
        Ok(username) => flash_redirect_ok(
            jar,
            "/login",
            format!("Registration successful! Your username is: {username}"),
        ),
        Err(RegisterError::MissingFields) => flash_redirect_ok(
            jar,
            "/register",
            "Please fill name, email and password.",
        ),
        Err(e) => Err(registration_failed(e)),
    }
}

pub async fn contractor_register_page(
    identity: Option<Identity>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    if identity.is_some() {
        return see_other_ok(jar, Redirect::to("/dashboard"));
    }
    let (jar, flashes) = flash::take(jar);

    success(
        jar,
        Page::new()
            .title("Contractor registration")
            .flashes(flashes)
            .body(maud! {
                h1 { "Register as a contractor" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Company name" }
                        input type="text" class="form-control" id="name" name="name" required;
                        div class="form-text" {
                            "Use the name exactly as it appears on your tenders."
                        }
                    }
                    div class="mb-3" {
                        label for="username" class="form-label" { "Username" }
                        input type="text" class="form-control" id="username" name="username" required;
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password" required;
                    }
                    button type="submit" class="btn btn-primary" { "Register" }
                }
            })
            .render(),
    )
}

pub async fn do_contractor_register(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<NewContractor>,
) -> StandardResponse {
    match Contractor::register(&state.store, form) {
        Ok(username) => flash_redirect_ok(
            jar,
            "/login",
            format!(
                "Contractor registration successful! Your username is: \
                 {username}"
            ),
        ),
        Err(RegisterError::MissingFields) => flash_redirect_ok(
            jar,
            "/contractor_register",
            "Please fill all fields.",
        ),
        Err(RegisterError::Duplicate) => flash_redirect_ok(
            jar,
            "/contractor_register",
            "Username already exists. Please choose another.",
        ),
        Err(RegisterError::InvalidUsername(why)) => flash_redirect_ok(
            jar,
            "/contractor_register",
            format!("Invalid username: {why}."),
        ),
        Err(e) => Err(registration_failed(e)),
    }
}
