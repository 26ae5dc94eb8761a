//! Route handlers

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Form,
};
use minijinja::context;

use super::server::SharedState;
use crate::admin;
use crate::auth::middleware::session_token;
use crate::auth::{
    flows, LoginForm, MaybeSession, RequireAdmin, RequireSession, Role, SessionUser, SignupForm,
};
use crate::error::{Error, Result};

/// Images shown on the members page
pub const GALLERY_IMAGES: &[&str] = &[
    "aurora.jpg",
    "canyon.jpg",
    "glacier.jpg",
    "harbor.jpg",
    "meadow.jpg",
    "summit.jpg",
];

/// 302 Found to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// 302 Found to `location`, setting a cookie on the way
fn found_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// Create a session for `user` and send the browser to the gallery
async fn start_session(state: &SharedState, user: SessionUser) -> Result<Response> {
    let (_, token) = state.sessions.create(user).await?;
    Ok(found_with_cookie("/members", state.sessions.set_cookie(&token)))
}

pub async fn home(
    State(state): State<SharedState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response> {
    let user = session.map(|s| s.user);
    Ok(state
        .pages
        .render("home.html", context! { user => user })?
        .into_response())
}

pub async fn signup_page(
    State(state): State<SharedState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response> {
    let user = session.map(|s| s.user);
    Ok(state
        .pages
        .render("signup.html", context! { user => user })?
        .into_response())
}

pub async fn signup(
    State(state): State<SharedState>,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    match flows::signup(state.users.as_ref(), &state.hasher, &form).await {
        Ok(user) => start_session(&state, user).await,
        Err(Error::Validation(message)) => Ok(state
            .pages
            .render(
                "signup.html",
                context! { error => message, name => form.name, email => form.email },
            )?
            .into_response()),
        Err(e) => Err(e),
    }
}

pub async fn login_page(
    State(state): State<SharedState>,
    MaybeSession(session): MaybeSession,
) -> Result<Response> {
    let user = session.map(|s| s.user);
    Ok(state
        .pages
        .render("login.html", context! { user => user })?
        .into_response())
}

pub async fn login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match flows::login(state.users.as_ref(), &state.hasher, &form).await {
        Ok(user) => start_session(&state, user).await,
        Err(e @ (Error::Validation(_) | Error::InvalidCredentials)) => Ok(state
            .pages
            .render(
                "login.html",
                context! { error => e.to_string(), email => form.email },
            )?
            .into_response()),
        Err(e) => Err(e),
    }
}

/// Best effort: the cookie is cleared and the user sent home even when the
/// session store cannot be reached
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers, &state) {
        match state.sessions.revoke(token).await {
            Ok(Some(id)) => tracing::info!("Session {} logged out", id),
            Ok(None) => {}
            Err(e) => tracing::error!("Failed to destroy session on logout: {}", e),
        }
    }
    found_with_cookie("/", state.sessions.clear_cookie())
}

pub async fn members(
    State(state): State<SharedState>,
    RequireSession(session): RequireSession,
) -> Result<Response> {
    Ok(state
        .pages
        .render(
            "members.html",
            context! {
                user => &session.user,
                name => &session.user.name,
                images => GALLERY_IMAGES,
            },
        )?
        .into_response())
}

pub async fn admin(
    State(state): State<SharedState>,
    RequireAdmin(session): RequireAdmin,
) -> Result<Response> {
    let users = admin::list_users(state.users.as_ref()).await?;
    Ok(state
        .pages
        .render("admin.html", context! { user => &session.user, users => users })?
        .into_response())
}

/// Apply a role change and return to the listing whatever the outcome
async fn change_role(state: &SharedState, id: &str, role: Role) -> Response {
    if let Err(e) = admin::set_role(state.users.as_ref(), id, role).await {
        tracing::error!("Failed to set role of user {} to {}: {}", id, role, e);
    }
    found("/admin")
}

pub async fn promote(
    State(state): State<SharedState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    change_role(&state, &id, Role::Admin).await
}

pub async fn demote(
    State(state): State<SharedState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> Response {
    change_role(&state, &id, Role::User).await
}

pub async fn not_found(
    State(state): State<SharedState>,
    MaybeSession(session): MaybeSession,
    uri: Uri,
) -> Result<Response> {
    let user = session.map(|s| s.user);
    let page = state
        .pages
        .render("404.html", context! { user => user, path => uri.path() })?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
