//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`DirectoryItem`], [`FileType`] - One normalized listing entry
//! - [`ProtocolMode`], [`Capabilities`] - What the backend speaks and allows
//! - [`Clipboard`], [`StatusMessage`] - Explorer UI state

mod explorer;
mod item;

pub use explorer::{
    Capabilities, Clipboard, ClipboardMode, ProtocolMode, StatusKind, StatusMessage,
};
pub use item::{DirectoryItem, FileType, compare_items, sort_items};
