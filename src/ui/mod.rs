//! HTML page rendering

mod templates;

pub use templates::Pages;
