//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name displayed in the header.
pub const APP_NAME: &str = "webfm";

/// Application version.
pub const APP_VERSION: &str = "0.1.0";

// =============================================================================
// Logging
// =============================================================================

/// Maximum level forwarded to the browser console.
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

// =============================================================================
// Listing Protocols
// =============================================================================

/// Query parameter that asks a backend for its JSON listing.
pub const LIST_QUERY_PARAM: &str = "__list";

/// Fixed PROPFIND body requesting the four properties the list view shows.
pub const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:displayname/>
    <d:getcontentlength/>
    <d:getlastmodified/>
    <d:resourcetype/>
  </d:prop>
</d:propfind>"#;

/// Content type sent with the PROPFIND body.
pub const PROPFIND_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Marker used by directory indexes for the parent entry.
pub const PARENT_DIR_MARKERS: &[&str] = &["..", "../"];

// =============================================================================
// Network Configuration
// =============================================================================

/// Maximum number of concurrent HEAD requests during metadata enrichment.
pub const ENRICH_CONCURRENCY: usize = 6;

/// Content type used for uploads that declare none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Largest preview fetched in full; bigger files are fetched with a Range header.
pub const PREVIEW_MAX_BYTES: u64 = 512 * 1024;

// =============================================================================
// UI Configuration
// =============================================================================

/// Delay before the upload progress banner is hidden, in milliseconds.
pub const UPLOAD_PROGRESS_HIDE_MS: u32 = 1500;

/// Milliseconds per second for rate computation.
pub const MS_PER_SECOND: f64 = 1000.0;

/// Icon theme selection.
///
/// Available themes:
/// - `Bootstrap` - Familiar, slightly bolder (default)
/// - `Lucide` - Minimal, thin strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Current icon theme used throughout the application.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;
