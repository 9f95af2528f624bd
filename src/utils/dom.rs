//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use wasm_bindgen::JsValue;
use web_sys::{Blob, FileList, Window};

use crate::core::UploadFile;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

// =============================================================================
// Location and History
// =============================================================================

/// Origin of the current page, e.g. `https://files.example:8443`.
pub fn location_origin() -> String {
    window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// Path of the current page, `/` when unavailable.
pub fn location_pathname() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "/".to_string())
}

/// Push `path` onto the session history without reloading the page.
pub fn push_history(path: &str) {
    if let Some(window) = window()
        && let Ok(history) = window.history()
    {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

// =============================================================================
// Dialogs
// =============================================================================

/// `window.confirm`; `false` when no window is available.
pub fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// `window.prompt`; `None` when cancelled.
pub fn prompt(message: &str, default: &str) -> Option<String> {
    window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

// =============================================================================
// Files
// =============================================================================

/// Wrap every file of a `FileList` for upload, in list order.
///
/// Contents are not read here; each file is streamed when its turn in the
/// upload queue comes.
pub fn collect_files(list: &FileList) -> Vec<UploadFile> {
    (0..list.length())
        .filter_map(|idx| list.get(idx))
        .map(|file| {
            let name = file.name();
            let content_type = file.type_();
            let blob: Blob = file.into();
            UploadFile::new(name, blob).with_content_type(content_type)
        })
        .collect()
}
