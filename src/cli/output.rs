//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::{Role, User};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a table of users
pub fn print_user_table(users: &[User]) {
    if users.is_empty() {
        info("No users yet. Sign up through the web UI first.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Email").fg(Color::Cyan),
            Cell::new("Role").fg(Color::Cyan),
            Cell::new("Created").fg(Color::Cyan),
        ]);

    for user in users {
        let role_color = match user.role {
            Role::Admin => Color::Yellow,
            Role::User => Color::Reset,
        };

        table.add_row(vec![
            Cell::new(&user.id),
            Cell::new(&user.name),
            Cell::new(&user.email),
            Cell::new(user.role).fg(role_color),
            Cell::new(user.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    println!("{table}");
}
