//! Remote mutations: folders, deletes, moves, copies and renames.
//!
//! Single operations return on the first error. Batch operations run
//! sequentially, continue past failures and return a [`BatchReport`].

use std::fmt;

use log::{info, warn};

use crate::core::error::MutationError;
use crate::core::orchestrator::FileManager;
use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::{Clipboard, ClipboardMode};
use crate::utils::path::{display_name, encode_path, join_path, last_segment, parent_path};

/// Outcome of a sequential batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Failed hrefs with their errors, in attempt order.
    pub errors: Vec<(String, MutationError)>,
}

impl BatchReport {
    fn record(&mut self, href: &str, result: Result<(), MutationError>) {
        match result {
            Ok(()) => self.succeeded += 1,
            Err(e) => {
                warn!("{}: {}", href, e);
                self.failed += 1;
                self.errors.push((href.to_string(), e));
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}

/// Reject empty names and names that would create a nested path.
pub fn validate_name(name: &str) -> Result<&str, MutationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." || trimmed.contains('/') {
        return Err(MutationError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

fn check(op: &'static str, status: u16) -> Result<(), MutationError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(MutationError::Http { op, status })
    }
}

impl<T: Transport> FileManager<T> {
    // =========================================================================
    // Single operations
    // =========================================================================

    /// `MKCOL path`.
    pub async fn create_folder(&self, path: &str) -> Result<(), MutationError> {
        let response = self
            .transport()
            .send(HttpRequest::new(Method::Mkcol, path))
            .await?;
        check("MKCOL", response.status)?;
        info!("created {}", path);
        Ok(())
    }

    /// Create folder `name` inside `base_path`; returns its href.
    pub async fn create_folder_in(
        &self,
        base_path: &str,
        name: &str,
    ) -> Result<String, MutationError> {
        let name = validate_name(name)?;
        let href = format!("{}/", join_path(base_path, &encode_path(name)));
        self.create_folder(&href).await?;
        Ok(href)
    }

    /// `DELETE path`.
    pub async fn delete_item(&self, path: &str) -> Result<(), MutationError> {
        let response = self
            .transport()
            .send(HttpRequest::new(Method::Delete, path))
            .await?;
        check("DELETE", response.status)?;
        info!("deleted {}", path);
        Ok(())
    }

    /// `MOVE` or `COPY` `src` to `dest`, never overwriting.
    ///
    /// A 412 becomes [`MutationError::DestinationExists`].
    pub async fn move_or_copy_item(
        &self,
        src: &str,
        dest: &str,
        is_copy: bool,
    ) -> Result<(), MutationError> {
        let (method, op) = if is_copy {
            (Method::Copy, "COPY")
        } else {
            (Method::Move, "MOVE")
        };
        let request = HttpRequest::new(method, src)
            .header("Destination", format!("{}{}", self.origin(), dest))
            .header("Overwrite", "F");
        let response = self.transport().send(request).await?;
        if response.status == 412 {
            return Err(MutationError::DestinationExists);
        }
        check(op, response.status)?;
        info!("{} {} -> {}", op, src, dest);
        Ok(())
    }

    /// Rename `src` within its directory; returns the new href.
    ///
    /// Renaming to the current name is a no-op.
    pub async fn rename_item(&self, src: &str, new_name: &str) -> Result<String, MutationError> {
        let new_name = validate_name(new_name)?;
        if new_name == display_name(src) {
            return Ok(src.to_string());
        }
        let mut dest = join_path(&parent_path(src), &encode_path(new_name));
        if src.ends_with('/') {
            dest.push('/');
        }
        self.move_or_copy_item(src, &dest, false).await?;
        Ok(dest)
    }

    // =========================================================================
    // Batch operations
    // =========================================================================

    /// Delete each href in order, continuing past failures.
    pub async fn batch_delete(&self, hrefs: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for href in hrefs {
            let result = self.delete_item(href).await;
            report.record(href, result);
        }
        info!("batch delete: {}", report);
        report
    }

    /// Move or copy every clipboard item into `dest_dir`, in order.
    ///
    /// Leaves the clipboard itself alone; see
    /// [`DirectorySession::finish_paste`](crate::core::DirectorySession::finish_paste).
    pub async fn paste(&self, clipboard: &Clipboard, dest_dir: &str) -> BatchReport {
        let mut report = BatchReport::default();
        let Some(mode) = clipboard.mode else {
            return report;
        };
        let is_copy = mode == ClipboardMode::Copy;

        for src in &clipboard.items {
            let mut dest = join_path(dest_dir, last_segment(src));
            if src.ends_with('/') {
                dest.push('/');
            }
            let result = self.move_or_copy_item(src, &dest, is_copy).await;
            report.record(src, result);
        }
        info!("paste into {}: {}", dest_dir, report);
        report
    }
}
