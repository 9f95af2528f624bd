//! File explorer UI components.
//!
//! Components:
//! - [`Explorer`] - Main explorer view
//! - [`Toolbar`] - Navigation and capability-gated actions
//! - [`FileList`] - List view of files and directories
//! - [`PathBar`] - Clickable breadcrumbs
//! - [`PreviewPanel`] - Side panel for text and image preview
//! - [`UploadBanner`] - Progress of the running upload

#[allow(clippy::module_inception)]
mod explorer;
mod file_list;
mod pathbar;
mod preview;
mod toolbar;
mod upload;

pub use explorer::Explorer;
pub use file_list::FileList;
pub use pathbar::PathBar;
pub use preview::PreviewPanel;
pub use toolbar::Toolbar;
pub use upload::UploadBanner;
