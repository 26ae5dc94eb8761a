//! Authorization guard extractors

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::auth::session::Session;
use crate::error::Error;
use crate::web::SharedState;

/// The request's session, if any
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

/// A session is required; anonymous requests are sent to the login page
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

/// An admin session is required
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Session);

/// Extract the signed session token from the request cookies
pub fn session_token<'a>(headers: &'a HeaderMap, state: &SharedState) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookies| state.sessions.token_from_cookie_header(cookies))
}

impl FromRequestParts<SharedState> for MaybeSession {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<MaybeSession>() {
            return Ok(cached.clone());
        }

        let session = match session_token(&parts.headers, state) {
            Some(token) => state.sessions.resolve(token).await?,
            None => None,
        };

        let extracted = MaybeSession(session);
        parts.extensions.insert(extracted.clone());
        Ok(extracted)
    }
}

impl FromRequestParts<SharedState> for RequireSession {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeSession::from_request_parts(parts, state).await? {
            MaybeSession(Some(session)) => Ok(RequireSession(session)),
            MaybeSession(None) => Err(Error::Unauthenticated {
                redirect_to: "/login",
            }),
        }
    }
}

impl FromRequestParts<SharedState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
        let Some(session) = session else {
            return Err(Error::Unauthenticated { redirect_to: "/" });
        };

        // trusts the role frozen into the session
        if !session.user.is_admin() {
            tracing::warn!(
                "Non-admin session {} denied admin route {}",
                session.id,
                parts.uri.path()
            );
            return Err(Error::Forbidden);
        }

        Ok(RequireAdmin(session))
    }
}
