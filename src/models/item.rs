use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// =============================================================================
// Directory Item
// =============================================================================

/// One entry of a directory listing, whatever protocol produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryItem {
    /// Display name (decoded, no trailing slash)
    pub name: String,
    /// Is this a directory?
    pub is_dir: bool,
    /// Size in bytes (None for directories or unknown)
    pub size: Option<u64>,
    /// Last modification time as an HTTP-date or RFC 3339 string
    pub mtime: Option<String>,
    /// Origin-rooted, percent-encoded path; directories end with `/`.
    ///
    /// This is the identity used for selection and clipboard membership.
    pub href: String,
    /// Raw size column text from an HTML index, when no real size is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_raw: Option<String>,
    /// Raw date column text from an HTML index, when no real mtime is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime_raw: Option<String>,
}

impl DirectoryItem {
    /// Create an item with no metadata.
    pub fn new(name: impl Into<String>, is_dir: bool, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir,
            size: None,
            mtime: None,
            href: href.into(),
            size_raw: None,
            mtime_raw: None,
        }
    }

    /// Builder-style size setter.
    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// Builder-style mtime setter.
    pub fn with_mtime(mut self, mtime: Option<String>) -> Self {
        self.mtime = mtime;
        self
    }

    /// File type of this item, by extension.
    pub fn file_type(&self) -> FileType {
        if self.is_dir {
            FileType::Directory
        } else {
            FileType::from_name(&self.name)
        }
    }
}

/// Directories first, then names in ascending (case-sensitive) order.
pub fn compare_items(a: &DirectoryItem, b: &DirectoryItem) -> Ordering {
    b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name))
}

/// Sort a listing in place with [`compare_items`].
pub fn sort_items(items: &mut [DirectoryItem]) {
    items.sort_by(compare_items);
}

// =============================================================================
// File Types
// =============================================================================

/// Coarse file classification used for icons and the preview action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    Directory,
    Markdown,
    Text,
    Image,
    Unknown,
}

impl FileType {
    /// Detect file type from a file name's extension.
    pub fn from_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => return Self::Unknown,
        };
        match ext.as_str() {
            "md" => Self::Markdown,
            "txt" | "log" | "sh" | "py" => Self::Text,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "bmp" | "webp" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Can this file be opened in the preview pane?
    pub fn is_previewable(self) -> bool {
        matches!(self, Self::Markdown | Self::Text | Self::Image)
    }
}
