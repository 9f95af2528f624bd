//! Directory session: the explorer's single piece of shared state.
//!
//! # Write ownership
//!
//! - Loading (`begin_load` / `publish`) replaces items, capabilities and the
//!   protocol mode. Only the orchestrator calls these.
//! - Selection methods mutate the selected set. Only selection handlers call
//!   these.
//! - Clipboard methods mutate the clipboard. Only batch actions call these.
//!
//! All mutation happens on the browser's single event loop between await
//! points, so no locking is involved; staleness is handled with a load
//! generation instead.

use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::core::mutations::BatchReport;
use crate::models::{
    Capabilities, Clipboard, ClipboardMode, DirectoryItem, ProtocolMode, StatusMessage,
};
use crate::utils::path::{compute_base_path, ensure_trailing_slash, normalize_href};

/// Result of a successful directory fetch, ready to publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    pub items: Vec<DirectoryItem>,
    pub mode: ProtocolMode,
    pub capabilities: Capabilities,
}

/// Proof that a load was started; only the latest ticket may publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    path: String,
}

impl LoadTicket {
    /// Directory this load is for.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Shared handle to a [`DirectorySession`].
///
/// Async flows never hold the session across an await; they go through this
/// trait for each short read or write instead. `None` means the session is
/// gone (for example, its owner was disposed).
pub trait SessionStore {
    fn update_session<R>(&self, f: impl FnOnce(&mut DirectorySession) -> R) -> Option<R>;
}

impl SessionStore for RefCell<DirectorySession> {
    fn update_session<R>(&self, f: impl FnOnce(&mut DirectorySession) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

/// Current directory, its items, and the user's selection and clipboard.
#[derive(Clone, Debug)]
pub struct DirectorySession {
    origin: String,
    base_path: String,
    items: Vec<DirectoryItem>,
    capabilities: Capabilities,
    protocol_mode: Option<ProtocolMode>,
    selected: BTreeSet<String>,
    clipboard: Clipboard,
    status: StatusMessage,
    generation: u64,
    loading: bool,
}

impl DirectorySession {
    /// Create a session for the page at `pathname` on `origin`.
    ///
    /// A file pathname opens its parent directory.
    pub fn new(origin: impl Into<String>, pathname: &str) -> Self {
        Self {
            origin: origin.into(),
            base_path: compute_base_path(pathname),
            items: Vec::new(),
            capabilities: Capabilities::default(),
            protocol_mode: None,
            selected: BTreeSet::new(),
            clipboard: Clipboard::default(),
            status: StatusMessage::default(),
            generation: 0,
            loading: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Current working directory, always ending with `/`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn items(&self) -> &[DirectoryItem] {
        &self.items
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Protocol that produced the current items (None before the first load).
    pub fn protocol_mode(&self) -> Option<ProtocolMode> {
        self.protocol_mode
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    /// Is a load in flight?
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = status;
    }

    // =========================================================================
    // Navigation and loading
    // =========================================================================

    /// Change the working directory to `href`; returns the new base path.
    ///
    /// Items are left in place until the next load publishes.
    pub fn navigate(&mut self, href: &str) -> String {
        self.base_path = ensure_trailing_slash(&normalize_href(href, &self.origin));
        self.base_path.clone()
    }

    /// Start a load of the current directory.
    ///
    /// Clears the selection and supersedes every earlier ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.selected.clear();
        self.generation += 1;
        self.loading = true;
        LoadTicket {
            generation: self.generation,
            path: self.base_path.clone(),
        }
    }

    /// Whether `ticket` is still the most recently issued one.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a finished load. Stale tickets are ignored and return `false`.
    pub fn publish(&mut self, ticket: &LoadTicket, listing: Listing) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.items = listing.items;
        self.capabilities = listing.capabilities;
        self.protocol_mode = Some(listing.mode);
        self.selected.clear();
        self.loading = false;
        true
    }

    /// Mark a load as failed. Items and capabilities stay as they were.
    pub fn fail_load(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        true
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn is_selected(&self, href: &str) -> bool {
        self.selected.contains(href)
    }

    /// Selected hrefs in listing order.
    pub fn selected_hrefs(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.href))
            .map(|item| item.href.clone())
            .collect()
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Flip membership of `href`; hrefs not in the listing are ignored.
    pub fn toggle_selection(&mut self, href: &str) {
        if self.selected.remove(href) {
            return;
        }
        if self.items.iter().any(|item| item.href == href) {
            self.selected.insert(href.to_string());
        }
    }

    /// Select every item, or clear the selection if everything is selected.
    pub fn toggle_select_all(&mut self) {
        if !self.items.is_empty() && self.selected.len() == self.items.len() {
            self.selected.clear();
        } else {
            self.selected = self.items.iter().map(|item| item.href.clone()).collect();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Put the selection on the clipboard for a move. Returns how many items.
    pub fn cut_selection(&mut self) -> usize {
        self.fill_clipboard(ClipboardMode::Move)
    }

    /// Put the selection on the clipboard for a copy. Returns how many items.
    pub fn copy_selection(&mut self) -> usize {
        self.fill_clipboard(ClipboardMode::Copy)
    }

    fn fill_clipboard(&mut self, mode: ClipboardMode) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        self.clipboard = Clipboard {
            mode: Some(mode),
            items: self.selected.clone(),
        };
        self.clipboard.items.len()
    }

    /// Settle the clipboard after a paste.
    ///
    /// A move clipboard is cleared only when nothing failed, so a partial
    /// failure can be retried as is. A copy clipboard is always kept.
    pub fn finish_paste(&mut self, report: &BatchReport) {
        if self.clipboard.mode == Some(ClipboardMode::Move) && report.failed == 0 {
            self.clipboard.clear();
        }
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard.clear();
    }
}
