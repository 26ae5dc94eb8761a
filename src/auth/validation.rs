//! Signup and login form validation

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::error::{Error, Result};

const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=30;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 5..=50;

/// bcrypt ignores everything past this many bytes
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Raw signup form; every field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Raw login form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .expect("Invalid regex pattern - this is a bug in the codebase")
    })
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("\"{}\" is required", field))),
    }
}

fn check_name(name: &str) -> Result<()> {
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Validation(
            "\"name\" must only contain alpha-numeric characters".to_string(),
        ));
    }
    if !NAME_LEN.contains(&name.len()) {
        return Err(Error::Validation(format!(
            "\"name\" length must be between {} and {} characters",
            NAME_LEN.start(),
            NAME_LEN.end()
        )));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<()> {
    if !email_regex().is_match(email) {
        return Err(Error::Validation(
            "\"email\" must be a valid email".to_string(),
        ));
    }
    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if !PASSWORD_LEN.contains(&len) {
        return Err(Error::Validation(format!(
            "\"password\" length must be between {} and {} characters",
            PASSWORD_LEN.start(),
            PASSWORD_LEN.end()
        )));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(Error::Validation(format!(
            "\"password\" must be at most {} bytes",
            PASSWORD_MAX_BYTES
        )));
    }
    Ok(())
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupInput> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        // passwords are taken verbatim
        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(Error::Validation("\"password\" is required".to_string())),
        };

        check_name(name)?;
        check_email(email)?;
        check_password(password)?;

        Ok(SignupInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginInput> {
        let email = required("email", &self.email)?;
        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(Error::Validation("\"password\" is required".to_string())),
        };

        check_email(email)?;
        check_password(password)?;

        Ok(LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}
