//! Browser file manager that negotiates between JSON, WebDAV and HTML-index
//! directory listings.

pub mod config;
pub mod core;
pub mod models;
pub mod utils;
