//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "gallery.toml";

/// Load configuration from gallery.toml, or from the environment when no file exists
pub fn load_config() -> Result<Config> {
    match find_config_file() {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            load_config_from_path(&path)
        }
        None => load_config_from_str(default_config_content()),
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    load_config_from_str(&content)
}

/// Interpolate and parse a TOML document
pub fn load_config_from_str(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Option<PathBuf> {
    let mut current = env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Default configuration, driven entirely by environment variables
pub fn default_config_content() -> &'static str {
    r#"# Gallery Configuration

[server]
host = "${HOST:-0.0.0.0}"
port = ${PORT:-3000}
public_dir = "./public"

[database]
backend = "postgres"  # or "memory"
host = "${DB_HOST:-localhost}"
port = ${DB_PORT:-5432}
user = "${DB_USER:-postgres}"
password = "${DB_PASSWORD}"
name = "${DB_NAME:-gallery}"

[session]
secret = "${SESSION_SECRET}"
ttl_secs = 3600
cookie_name = "gallery.sid"
purge_interval_secs = 60

[auth]
bcrypt_cost = 12
"#
}
