//! Core logic of the file explorer.
//!
//! This module provides:
//! - [`adapters`] for the JSON, WebDAV and HTML-index listing protocols
//! - [`probe_capabilities`] for `OPTIONS`-based write capability discovery
//! - [`DirectorySession`] holding the current directory, selection and clipboard
//! - [`FileManager`] loading listings and performing mutations over a [`Transport`],
//!   plus session-level flows that report into the status line

mod actions;
pub mod adapters;
mod capabilities;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod mutations;
mod orchestrator;
mod preview;
mod session;
pub mod transport;
mod upload;

pub use capabilities::{capabilities_from_headers, probe_capabilities};
pub use mutations::{BatchReport, validate_name};
pub use orchestrator::{FileManager, HeadInfo, LoadOutcome};
pub use preview::Preview;
pub use session::{DirectorySession, Listing, LoadTicket, SessionStore};
pub use transport::{Body, HttpRequest, HttpResponse, Method, ProgressFn, Transport};
pub use upload::{ProgressObserver, UploadFile, UploadProgress};
