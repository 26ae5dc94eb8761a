//! Authentication and session management

pub mod flows;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod session;
pub mod validation;

pub use jwt::CookieSigner;
pub use middleware::{MaybeSession, RequireAdmin, RequireSession};
pub use models::{NewUser, Role, SessionUser, User, UserSummary};
pub use password::PasswordHasher;
pub use session::{Session, SessionManager, SessionStore};
pub use validation::{LoginForm, SignupForm};
