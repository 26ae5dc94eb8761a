//! CLI command implementations

use anyhow::Result;
use std::fs;

use crate::admin;
use crate::auth::Role;
use crate::cli::{error, info, print_user_table, success, warn, OutputFormat};
use crate::config::{self, loader::CONFIG_FILENAME, Config, StoreBackend};
use crate::store::{PgStore, UserStore};

/// Initialize a new gallery.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set SESSION_SECRET and the DB_* variables, then run 'gallery serve'");

    Ok(())
}

/// Start the web server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::web::run_server(config, &host, port).await?;
    Ok(())
}

/// Create the database tables
pub async fn migrate() -> Result<()> {
    let store = connect_store().await?;
    store.migrate().await?;
    success("Database schema is up to date");
    Ok(())
}

/// List registered users
pub async fn users(format: OutputFormat) -> Result<()> {
    let store = connect_store().await?;
    let users = store.list().await?;

    match format {
        OutputFormat::Table => print_user_table(&users),
        OutputFormat::Json => {
            let summaries = admin::list_users(&store).await?;
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }

    Ok(())
}

/// Give a user the admin role
pub async fn promote(email: &str) -> Result<()> {
    change_role(email, Role::Admin).await
}

/// Return a user to the regular role
pub async fn demote(email: &str) -> Result<()> {
    change_role(email, Role::User).await
}

async fn change_role(email: &str, role: Role) -> Result<()> {
    let store = connect_store().await?;

    let Some(user) = store.find_by_email(email).await? else {
        error(&format!("No user with email {}", email));
        anyhow::bail!("user not found");
    };

    admin::set_role(&store, &user.id, role).await?;
    success(&format!("{} is now {}", user.email, role));
    info("Sessions that are already open keep their old role until the user logs in again");
    Ok(())
}

fn load_config() -> Result<Config> {
    let config = config::load_config()?;
    config.validate()?;
    Ok(config)
}

async fn connect_store() -> Result<PgStore> {
    let config = config::load_config()?;
    if config.database.backend == StoreBackend::Memory {
        anyhow::bail!("the memory backend only lives inside a running server");
    }
    let store = PgStore::connect(&config.database).await?;
    Ok(store)
}
