//! Listing adapters, one per directory-listing protocol.
//!
//! Every adapter turns one protocol's response into the same
//! [`DirectoryItem`] shape. [`list_with`] dispatches on [`ProtocolMode`] so the
//! orchestrator can walk [`ProtocolMode::FALLBACK_ORDER`] as plain data.

mod html;
mod json;
mod webdav;

pub use html::{list_by_html_index, parse_html_index};
pub use json::{list_by_json, listing_url, parse_json_listing};
pub use webdav::{list_by_webdav, parse_multistatus};

use crate::core::error::AdapterError;
use crate::core::transport::Transport;
use crate::models::{DirectoryItem, ProtocolMode};

/// List `dir_path` using one specific protocol.
pub async fn list_with<T: Transport>(
    mode: ProtocolMode,
    transport: &T,
    dir_path: &str,
    origin: &str,
) -> Result<Vec<DirectoryItem>, AdapterError> {
    match mode {
        ProtocolMode::Json => list_by_json(transport, dir_path).await,
        ProtocolMode::WebDav => list_by_webdav(transport, dir_path, origin).await,
        ProtocolMode::HtmlIndex => list_by_html_index(transport, dir_path, origin).await,
    }
}
