//! Utility modules for paths, formatting, and browser APIs.
//!
//! Provides:
//! - [`path`] - Canonical href handling shared by every listing protocol
//! - [`format`] - Size and date rendering for the list view
//! - [`FetchTransport`] - The browser implementation of the HTTP seam
//! - [`logger`] - `log` backend writing to the browser console

pub mod dom;
mod fetch;
pub mod format;
pub mod logger;
pub mod path;

pub use fetch::FetchTransport;
