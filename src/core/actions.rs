//! User-level flows: run a mutation, report it, resynchronize.
//!
//! Every flow ends with a full reload of the current directory instead of
//! patching items locally. Failures never escape; they become the session's
//! status message.

use log::debug;

use crate::core::error::MutationError;
use crate::core::mutations::BatchReport;
use crate::core::orchestrator::{FileManager, LoadOutcome};
use crate::core::session::SessionStore;
use crate::core::transport::Transport;
use crate::core::upload::{ProgressObserver, UploadFile};
use crate::models::{Capabilities, Clipboard, StatusMessage};
use crate::utils::path::display_name;

fn batch_status(verb: &str, report: &BatchReport) -> StatusMessage {
    if report.is_clean() {
        StatusMessage::success(format!("{} {} item(s)", verb, report.succeeded))
    } else {
        StatusMessage::error(format!("{}: {}", verb, report))
    }
}

impl<T: Transport> FileManager<T> {
    /// Reload, leaving any failure in the status line.
    pub async fn reload<S: SessionStore>(&self, session: &S) -> Option<LoadOutcome> {
        self.refresh(session).await.ok()
    }

    /// Change directory to `href` and load it; returns the new base path
    /// whether or not the load succeeded.
    pub async fn open_dir<S: SessionStore>(&self, session: &S, href: &str) -> String {
        self.open_dir_with(session, href, |_| {}).await
    }

    /// [`open_dir`](Self::open_dir), calling `entered` with the new base path
    /// before any request is sent. History entries are pushed from there so
    /// they keep click order even when loads finish out of order.
    pub async fn open_dir_with<S: SessionStore>(
        &self,
        session: &S,
        href: &str,
        entered: impl FnOnce(&str),
    ) -> String {
        let base = session
            .update_session(|s| s.navigate(href))
            .unwrap_or_default();
        entered(&base);
        self.reload(session).await;
        base
    }

    /// Create `name` in the current directory.
    pub async fn new_folder<S: SessionStore>(&self, session: &S, name: &str) {
        let Some(base) = session.update_session(|s| s.base_path().to_string()) else {
            return;
        };
        let status = match self.create_folder_in(&base, name).await {
            Ok(href) => StatusMessage::success(format!("Created {}", display_name(&href))),
            Err(e) => StatusMessage::error(format!("Create folder failed: {}", e)),
        };
        self.finish(session, status).await;
    }

    /// Rename one item of the current directory.
    pub async fn rename_entry<S: SessionStore>(&self, session: &S, href: &str, new_name: &str) {
        let status = match self.rename_item(href, new_name).await {
            Ok(dest) if dest == href => return,
            Ok(dest) => StatusMessage::success(format!(
                "Renamed {} to {}",
                display_name(href),
                display_name(&dest)
            )),
            Err(e) => StatusMessage::error(format!("Rename failed: {}", e)),
        };
        self.finish(session, status).await;
    }

    /// Delete every selected item.
    pub async fn delete_selected<S: SessionStore>(&self, session: &S) -> Option<BatchReport> {
        let hrefs = session.update_session(|s| s.selected_hrefs())?;
        if hrefs.is_empty() {
            session.update_session(|s| s.set_status(StatusMessage::info("Nothing selected")));
            return None;
        }
        let report = self.batch_delete(&hrefs).await;
        self.finish(session, batch_status("Deleted", &report)).await;
        Some(report)
    }

    /// Paste the clipboard into the current directory.
    pub async fn paste_here<S: SessionStore>(&self, session: &S) -> Option<BatchReport> {
        let (clipboard, base): (Clipboard, String) =
            session.update_session(|s| (s.clipboard().clone(), s.base_path().to_string()))?;
        if clipboard.is_empty() {
            session.update_session(|s| s.set_status(StatusMessage::info("Clipboard is empty")));
            return None;
        }

        let report = self.paste(&clipboard, &base).await;
        session.update_session(|s| s.finish_paste(&report));
        self.finish(session, batch_status("Pasted", &report)).await;
        Some(report)
    }

    /// Upload `files` into the current directory.
    pub async fn upload_here<S: SessionStore>(
        &self,
        session: &S,
        files: Vec<UploadFile>,
        observer: ProgressObserver,
    ) -> Result<BatchReport, MutationError> {
        let (capabilities, base): (Capabilities, String) = session
            .update_session(|s| (s.capabilities(), s.base_path().to_string()))
            .unwrap_or_default();

        match self.upload_files(&capabilities, &base, files, observer).await {
            Ok(report) => {
                self.finish(session, batch_status("Uploaded", &report)).await;
                Ok(report)
            }
            Err(e) => {
                session.update_session(|s| {
                    s.set_status(StatusMessage::error(format!("Upload rejected: {}", e)))
                });
                Err(e)
            }
        }
    }

    /// Reload, then show `status` unless the reload itself failed.
    async fn finish<S: SessionStore>(&self, session: &S, status: StatusMessage) {
        debug!("{}", status.text);
        if self.refresh(session).await.is_ok() {
            session.update_session(|s| s.set_status(status));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use super::*;
    use crate::core::mock::{MockServer, Protocols};
    use crate::core::session::DirectorySession;
    use crate::core::transport::Method;
    use crate::core::upload::UploadProgress;
    use crate::models::{ClipboardMode, StatusKind};

    const ORIGIN: &str = "http://mock.local";

    async fn setup() -> (FileManager<MockServer>, RefCell<DirectorySession>) {
        let server = MockServer::new(Protocols::all());
        server.add_dir("/work/");
        server.add_dir("/work/archive/");
        server.add_file("/work/one.txt", b"1".to_vec());
        server.add_file("/work/two.txt", b"22".to_vec());
        server.add_file("/work/three.txt", b"333".to_vec());
        let fm = FileManager::new(server, ORIGIN);
        let session = RefCell::new(DirectorySession::new(ORIGIN, "/work/"));
        fm.refresh(&session).await.unwrap();
        (fm, session)
    }

    fn hrefs(session: &RefCell<DirectorySession>) -> BTreeSet<String> {
        session
            .borrow()
            .items()
            .iter()
            .map(|i| i.href.clone())
            .collect()
    }

    fn select(session: &RefCell<DirectorySession>, items: &[&str]) {
        let mut session = session.borrow_mut();
        for href in items {
            session.toggle_selection(href);
        }
    }

    #[tokio::test]
    async fn test_batch_delete_partial_failure() {
        let (fm, session) = setup().await;
        fm.transport().fail(Method::Delete, "/work/two.txt", 500);
        select(&session, &["/work/one.txt", "/work/two.txt", "/work/three.txt"]);

        let report = fm.delete_selected(&session).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 2);

        let after = hrefs(&session);
        assert!(!after.contains("/work/one.txt"));
        assert!(after.contains("/work/two.txt"));
        assert!(!after.contains("/work/three.txt"));
        let session = session.borrow();
        assert_eq!(session.selection_len(), 0);
        assert_eq!(session.status().kind, StatusKind::Error);
        assert_eq!(session.status().text, "Deleted: 2 succeeded, 1 failed");
    }

    #[tokio::test]
    async fn test_cut_paste_clears_clipboard() {
        let (fm, session) = setup().await;
        select(&session, &["/work/one.txt", "/work/two.txt"]);
        session.borrow_mut().cut_selection();

        assert_eq!(fm.open_dir(&session, "/work/archive/").await, "/work/archive/");
        let report = fm.paste_here(&session).await.unwrap();
        assert!(report.is_clean());
        assert!(session.borrow().clipboard().is_empty());
        assert_eq!(
            hrefs(&session),
            BTreeSet::from([
                "/work/archive/one.txt".to_string(),
                "/work/archive/two.txt".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_copy_paste_keeps_clipboard() {
        let (fm, session) = setup().await;
        select(&session, &["/work/one.txt", "/work/two.txt"]);
        session.borrow_mut().copy_selection();

        assert_eq!(fm.open_dir(&session, "/work/archive/").await, "/work/archive/");
        assert!(fm.paste_here(&session).await.unwrap().is_clean());
        let clipboard = session.borrow().clipboard().clone();
        assert_eq!(clipboard.mode, Some(ClipboardMode::Copy));
        assert_eq!(clipboard.items.len(), 2);
        assert!(fm.transport().exists("/work/one.txt"));
    }

    #[tokio::test]
    async fn test_partial_move_keeps_whole_clipboard() {
        let (fm, session) = setup().await;
        select(&session, &["/work/one.txt", "/work/two.txt"]);
        session.borrow_mut().cut_selection();
        fm.transport().fail(Method::Move, "/work/one.txt", 500);

        assert_eq!(fm.open_dir(&session, "/work/archive/").await, "/work/archive/");
        let report = fm.paste_here(&session).await.unwrap();
        assert_eq!(report.failed, 1);
        let clipboard = session.borrow().clipboard().clone();
        assert_eq!(
            clipboard.items,
            BTreeSet::from(["/work/one.txt".to_string(), "/work/two.txt".to_string()])
        );
        assert_eq!(clipboard.mode, Some(ClipboardMode::Move));
    }

    #[tokio::test]
    async fn test_new_folder_and_rename() {
        let (fm, session) = setup().await;
        fm.new_folder(&session, "fresh stuff").await;
        assert!(hrefs(&session).contains("/work/fresh%20stuff/"));
        assert_eq!(session.borrow().status().kind, StatusKind::Success);

        fm.rename_entry(&session, "/work/fresh%20stuff/", "stale").await;
        assert!(hrefs(&session).contains("/work/stale/"));

        fm.new_folder(&session, "").await;
        assert_eq!(session.borrow().status().kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn test_upload_refused_without_put() {
        let (fm, session) = setup().await;
        fm.transport().set_allow("GET, HEAD, OPTIONS");
        fm.refresh(&session).await.unwrap();
        fm.transport().clear_requests();

        let files = vec![UploadFile::new("x.txt", b"x".to_vec())];
        let result = fm
            .upload_here(&session, files, Rc::new(|_: &UploadProgress| {}))
            .await;
        assert_eq!(result, Err(MutationError::Unsupported("PUT")));
        assert!(fm.transport().requests().is_empty());
        assert_eq!(session.borrow().status().kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn test_upload_reloads() {
        let (fm, session) = setup().await;
        let files = vec![UploadFile::new("new.txt", b"hello".to_vec())];
        let report = fm
            .upload_here(&session, files, Rc::new(|_: &UploadProgress| {}))
            .await
            .unwrap();
        assert_eq!(report.succeeded, 1);
        assert!(hrefs(&session).contains("/work/new.txt"));
        assert_eq!(session.borrow().status().text, "Uploaded 1 item(s)");
    }

    #[tokio::test]
    async fn test_empty_selection_and_clipboard() {
        let (fm, session) = setup().await;
        assert_eq!(fm.delete_selected(&session).await, None);
        assert_eq!(session.borrow().status().text, "Nothing selected");
        assert_eq!(fm.paste_here(&session).await, None);
        assert_eq!(fm.transport().count(Method::Delete), 0);
    }

    #[tokio::test]
    async fn test_open_dir_enters_before_loading() {
        let (fm, session) = setup().await;
        fm.transport().add_dir("/work/sub/");
        fm.transport().clear_requests();
        let entered = RefCell::new(Vec::new());

        let base = fm
            .open_dir_with(&session, "/work/sub", |base| {
                entered
                    .borrow_mut()
                    .push((base.to_string(), fm.transport().requests().len()));
            })
            .await;

        assert_eq!(base, "/work/sub/");
        assert_eq!(*entered.borrow(), vec![("/work/sub/".to_string(), 0)]);
        assert_eq!(session.borrow().base_path(), "/work/sub/");
    }
}
