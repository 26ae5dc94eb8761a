//! CLI interface for Gallery

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gallery")]
#[command(author = "Krakaw")]
#[command(version = "1.0.0")]
#[command(about = "Members-only gallery with session login", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a gallery.toml configuration file
    Init,

    /// Start the web server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port, 3000)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Create the database tables
    Migrate,

    /// List registered users
    Users {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Give a user the admin role
    Promote {
        /// Email of the account
        email: String,
    },

    /// Return a user to the regular role
    Demote {
        /// Email of the account
        email: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
