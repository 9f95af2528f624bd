//! Explorer-related data types for the file browser UI.

use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// Protocol Mode
// =============================================================================

/// Listing protocol that produced the current directory's items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolMode {
    /// `GET <dir>?__list=1` returning JSON
    Json,
    /// `PROPFIND` with `Depth: 1`
    WebDav,
    /// Plain `GET` of an HTML directory index
    HtmlIndex,
}

impl ProtocolMode {
    /// Order in which protocols are attempted.
    pub const FALLBACK_ORDER: [ProtocolMode; 3] = [Self::Json, Self::WebDav, Self::HtmlIndex];

    /// Whether per-file HEAD enrichment should run after a listing in this mode.
    pub fn needs_enrichment(self) -> bool {
        !matches!(self, Self::WebDav)
    }
}

impl fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::WebDav => write!(f, "webdav"),
            Self::HtmlIndex => write!(f, "html-index"),
        }
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// Write capabilities advertised by the server for the current directory.
///
/// Recomputed on every directory load; the default is everything closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_put: bool,
    pub supports_move: bool,
    pub supports_delete: bool,
    pub supports_mkcol: bool,
    pub supports_copy: bool,
    pub is_webdav: bool,
}

// =============================================================================
// Clipboard
// =============================================================================

/// What a paste does with the clipboard contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipboardMode {
    Move,
    Copy,
}

/// Cut/copy payload. Survives navigation so items can be pasted elsewhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clipboard {
    /// None when nothing has been cut or copied
    pub mode: Option<ClipboardMode>,
    /// Hrefs of the cut/copied items
    pub items: BTreeSet<String>,
}

impl Clipboard {
    /// Is there anything to paste?
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() || self.items.is_empty()
    }

    /// Is `href` marked as cut (pending move)?
    pub fn is_cut(&self, href: &str) -> bool {
        self.mode == Some(ClipboardMode::Move) && self.items.contains(href)
    }

    pub fn clear(&mut self) {
        self.mode = None;
        self.items.clear();
    }
}

// =============================================================================
// Status Line
// =============================================================================

/// Severity of a status message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

/// Short message shown in the status line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_order() {
        assert_eq!(
            ProtocolMode::FALLBACK_ORDER,
            [ProtocolMode::Json, ProtocolMode::WebDav, ProtocolMode::HtmlIndex]
        );
        assert!(ProtocolMode::Json.needs_enrichment());
        assert!(ProtocolMode::HtmlIndex.needs_enrichment());
        assert!(!ProtocolMode::WebDav.needs_enrichment());
    }

    #[test]
    fn test_clipboard_cut_marker() {
        let mut clip = Clipboard::default();
        assert!(clip.is_empty());

        clip.mode = Some(ClipboardMode::Move);
        clip.items.insert("/a.txt".to_string());
        assert!(!clip.is_empty());
        assert!(clip.is_cut("/a.txt"));
        assert!(!clip.is_cut("/b.txt"));

        clip.mode = Some(ClipboardMode::Copy);
        assert!(!clip.is_cut("/a.txt"));

        clip.clear();
        assert!(clip.is_empty());
    }
}
