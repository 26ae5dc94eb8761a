//! Gallery - members-only image gallery with session login
//!
//! This is the library interface for Gallery, exposing the stores, auth
//! flows and router so the server can be embedded or tested in-process.

pub mod admin;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod ui;
pub mod web;

pub use config::Config;
pub use error::Error;
