//! Signup and login

use crate::auth::models::{NewUser, Role, SessionUser};
use crate::auth::password::PasswordHasher;
use crate::auth::validation::{LoginForm, SignupForm};
use crate::error::{Error, Result};
use crate::store::UserStore;

/// Register a new account.
///
/// The returned snapshot only carries the name, which is all a signup
/// session holds.
pub async fn signup(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
    form: &SignupForm,
) -> Result<SessionUser> {
    let input = form.validate()?;
    let password_hash = hasher.hash(&input.password).await?;

    let user = users
        .insert(NewUser {
            name: input.name,
            email: input.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!("New user signed up: {} ({})", user.name, user.id);
    Ok(SessionUser::name_only(user.name))
}

/// Check credentials and return the user snapshot for a new session
pub async fn login(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
    form: &LoginForm,
) -> Result<SessionUser> {
    let input = form.validate()?;

    let Some(user) = users.find_by_email(&input.email).await? else {
        tracing::info!("Login failed: unknown email");
        return Err(Error::InvalidCredentials);
    };

    if !hasher.verify(&input.password, &user.password_hash).await? {
        tracing::info!("Login failed: wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    tracing::info!("User logged in: {} ({})", user.name, user.id);
    Ok(SessionUser::from(&user))
}
