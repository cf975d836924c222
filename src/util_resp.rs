use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::{Rendered, prelude::*};

use crate::{
    flash, store::StoreError, template::Page, widgets::alert::ErrorAlert,
};

pub fn see_other_ok(jar: PrivateCookieJar, r: Redirect) -> StandardResponse {
    Ok(SuccessResponse::SeeOther(jar, r))
}

/// Redirects to `to`, queueing `msg` to be shown on the page that follows.
pub fn flash_redirect(
    jar: PrivateCookieJar,
    to: &str,
    msg: impl Into<String>,
) -> SuccessResponse {
    SuccessResponse::SeeOther(flash::push(jar, msg), Redirect::to(to))
}

pub fn flash_redirect_ok(
    jar: PrivateCookieJar,
    to: &str,
    msg: impl Into<String>,
) -> StandardResponse {
    Ok(flash_redirect(jar, to, msg))
}

pub fn success(jar: PrivateCookieJar, html: Rendered<String>) -> StandardResponse {
    Ok(SuccessResponse::Success(jar, html))
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

pub enum SuccessResponse {
    Success(PrivateCookieJar, Rendered<String>),
    SeeOther(PrivateCookieJar, Redirect),
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(jar, html) => {
                (jar, Html(html.into_inner())).into_response()
            }
            SuccessResponse::SeeOther(jar, redirect) => {
                (jar, redirect).into_response()
            }
        }
    }
}

#[derive(Debug)]
pub enum FailureResponse {
    ServerError(()),
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        match self {
            FailureResponse::ServerError(()) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(
                    Page::new()
                        .title("Error")
                        .body(maud! {
                            ErrorAlert
                                msg = "Something went wrong while saving your
                                       changes. Please try again later.";
                        })
                        .render()
                        .into_inner(),
                ),
            )
                .into_response(),
        }
    }
}

impl From<StoreError> for FailureResponse {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "storage failure");
        FailureResponse::ServerError(())
    }
}
