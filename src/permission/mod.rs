//! Role checks. Each extractor rejects by redirecting the user to a page
//! they are allowed to see, with an explanatory flash message.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{
    auth::{Identity, Role, accounts::Contractor, clear_login_cookie},
    state::AppState,
    util_resp::flash_redirect,
};

async fn jar<S>(parts: &mut Parts, state: &S) -> PrivateCookieJar
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    PrivateCookieJar::<Key>::from_request_parts(parts, state)
        .await
        .unwrap_or_else(|never| match never {})
}

/// A logged-in citizen.
pub struct IsCitizen(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for IsCitizen
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if identity.role == Role::Citizen {
            return Ok(IsCitizen(identity));
        }

        Err(flash_redirect(
            jar(parts, state).await,
            "/contractor_dashboard",
            "Unauthorized. Contractors cannot submit reports or feedback.",
        )
        .into_response())
    }
}

/// A logged-in contractor, along with their display name (which is what
/// tenders refer to them by).
pub struct IsContractor {
    pub identity: Identity,
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for IsContractor
where
    S: Send + Sync,
    Key: FromRef<S>,
    AppState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if identity.role != Role::Contractor {
            return Err(flash_redirect(
                jar(parts, state).await,
                "/dashboard",
                "Unauthorized access.",
            )
            .into_response());
        }

        let app = AppState::from_ref(state);
        match Contractor::find(&app.store, &identity.username) {
            Some(contractor) => Ok(IsContractor {
                identity,
                name: contractor.name,
            }),
            None => {
                tracing::warn!(
                    username = %identity.username,
                    "session refers to a contractor who no longer exists"
                );
                let jar = clear_login_cookie(jar(parts, state).await);
                Err(flash_redirect(
                    jar,
                    "/login",
                    "Contractor account not found. Please log in again.",
                )
                .into_response())
            }
        }
    }
}
