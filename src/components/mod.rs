//! UI components built with Leptos.
//!
//! - [`explorer`] - File browser UI (toolbar, list, preview, upload banner)
//! - [`icons`] - Centralized icon definitions (change theme here)
//! - [`status`] - Status line showing the last outcome and listing protocol

pub mod explorer;
pub mod icons;
pub mod status;
