//! File uploads via `PUT`, one file at a time, with progress.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use log::info;

use crate::config::{DEFAULT_CONTENT_TYPE, MS_PER_SECOND};
use crate::core::error::MutationError;
use crate::core::mutations::BatchReport;
use crate::core::orchestrator::FileManager;
use crate::core::transport::{Body, HttpRequest, Method, Transport};
use crate::models::Capabilities;
use crate::utils::path::{encode_path, join_path};

/// A file picked or dropped by the user.
///
/// Browser files stay a [`Body::Blob`] and are streamed by the transport;
/// nothing is read into memory before its `PUT` starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    /// Base name of the file.
    pub name: String,
    pub content_type: Option<String>,
    pub body: Body,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            body: body.into(),
        }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> u64 {
        self.body.len()
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into()).filter(|ct: &String| !ct.is_empty());
        self
    }
}

/// Progress of the file currently being uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadProgress {
    pub file_name: String,
    /// Position of this file in the queue, starting at 1.
    pub index: usize,
    pub count: usize,
    pub total_bytes: u64,
    transferred: u64,
    started_at: DateTime<Utc>,
}

impl UploadProgress {
    pub fn new(file_name: impl Into<String>, index: usize, count: usize, total_bytes: u64) -> Self {
        Self::starting_at(file_name, index, count, total_bytes, Utc::now())
    }

    pub fn starting_at(
        file_name: impl Into<String>,
        index: usize,
        count: usize,
        total_bytes: u64,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            index,
            count,
            total_bytes,
            transferred: 0,
            started_at,
        }
    }

    /// Record a new cumulative byte count. Never moves backwards.
    pub fn advance(&mut self, transferred: u64) {
        self.transferred = self.transferred.max(transferred.min(self.total_bytes));
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Completion in percent, 100 for empty files.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        self.transferred as f64 * 100.0 / self.total_bytes as f64
    }

    /// Bytes per second between the start and `now`.
    pub fn rate_at(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_ms = (now - self.started_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0.0;
        }
        self.transferred as f64 / (elapsed_ms as f64 / MS_PER_SECOND)
    }

    pub fn rate(&self) -> f64 {
        self.rate_at(Utc::now())
    }
}

/// Observer for upload progress.
pub type ProgressObserver = Rc<dyn Fn(&UploadProgress)>;

impl<T: Transport> FileManager<T> {
    /// `PUT` one file into `base_path`, overwriting; returns its href.
    pub async fn upload_file(
        &self,
        base_path: &str,
        file: UploadFile,
        progress: Rc<RefCell<UploadProgress>>,
        observer: ProgressObserver,
    ) -> Result<String, MutationError> {
        let href = join_path(base_path, &encode_path(&file.name));
        let content_type = file
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let request = HttpRequest::new(Method::Put, href.as_str())
            .header("Content-Type", content_type)
            .header("Overwrite", "T")
            .body(file.body);

        let on_progress = {
            let progress = Rc::clone(&progress);
            Rc::new(move |bytes: u64| {
                progress.borrow_mut().advance(bytes);
                observer(&progress.borrow());
            })
        };
        let response = self
            .transport()
            .send_with_progress(request, on_progress)
            .await?;
        if !response.is_ok() {
            return Err(MutationError::Http {
                op: "PUT",
                status: response.status,
            });
        }
        info!("uploaded {}", href);
        Ok(href)
    }

    /// Upload `files` into `base_path` sequentially.
    ///
    /// Rejected up front, before any request, when the server does not
    /// accept `PUT`.
    pub async fn upload_files(
        &self,
        capabilities: &Capabilities,
        base_path: &str,
        files: Vec<UploadFile>,
        observer: ProgressObserver,
    ) -> Result<BatchReport, MutationError> {
        if !capabilities.supports_put {
            return Err(MutationError::Unsupported("PUT"));
        }

        let count = files.len();
        let mut report = BatchReport::default();
        for (idx, file) in files.into_iter().enumerate() {
            let name = file.name.clone();
            let progress = Rc::new(RefCell::new(UploadProgress::new(
                name.as_str(),
                idx + 1,
                count,
                file.size(),
            )));
            observer(&progress.borrow());
            match self
                .upload_file(base_path, file, progress, Rc::clone(&observer))
                .await
            {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    report.errors.push((name, e));
                }
            }
        }
        info!("upload into {}: {}", base_path, report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::core::mock::{MockServer, Protocols};

    fn manager() -> FileManager<MockServer> {
        let server = MockServer::new(Protocols::all());
        server.add_dir("/up/");
        FileManager::new(server, "http://mock.local")
    }

    fn writable() -> Capabilities {
        Capabilities {
            supports_put: true,
            ..Capabilities::default()
        }
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut progress = UploadProgress::new("f", 1, 1, 100);
        progress.advance(40);
        progress.advance(10);
        assert_eq!(progress.transferred(), 40);
        progress.advance(500);
        assert_eq!(progress.transferred(), 100);
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_rate() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut progress = UploadProgress::starting_at("f", 1, 1, 10_000, start);
        progress.advance(4_000);
        assert_eq!(progress.rate_at(start + Duration::seconds(2)), 2_000.0);
        assert_eq!(progress.rate_at(start), 0.0);
    }

    #[tokio::test]
    async fn test_upload_gated_on_put() {
        let fm = manager();
        let files = vec![UploadFile::new("a.txt", b"a".to_vec())];
        let result = fm
            .upload_files(&Capabilities::default(), "/up/", files, Rc::new(|_: &UploadProgress| {}))
            .await;
        assert_eq!(result, Err(MutationError::Unsupported("PUT")));
        assert!(fm.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_headers_and_progress() {
        let fm = manager();
        let seen: Rc<RefCell<Vec<(usize, u64)>>> = Rc::default();
        let observer: ProgressObserver = {
            let seen = Rc::clone(&seen);
            Rc::new(move |p: &UploadProgress| seen.borrow_mut().push((p.index, p.transferred())))
        };
        let files = vec![
            UploadFile::new("my notes.md", b"hello".to_vec()).with_content_type("text/markdown"),
            UploadFile::new("raw", vec![1, 2, 3]),
        ];

        let report = fm
            .upload_files(&writable(), "/up/", files, observer)
            .await
            .unwrap();
        assert_eq!(report.succeeded, 2);

        let requests = fm.transport().full_requests();
        assert_eq!(requests[0].url, "/up/my%20notes.md");
        assert_eq!(requests[0].headers.get("Overwrite"), Some("T"));
        assert_eq!(requests[0].headers.get("Content-Type"), Some("text/markdown"));
        assert_eq!(
            requests[1].headers.get("Content-Type"),
            Some(DEFAULT_CONTENT_TYPE)
        );
        assert_eq!(
            fm.transport().file_data("/up/my%20notes.md"),
            Some(b"hello".to_vec())
        );
        // Start and finish of each file, in queue order
        assert_eq!(*seen.borrow(), vec![(1, 0), (1, 5), (2, 0), (2, 3)]);
    }

    #[tokio::test]
    async fn test_upload_overwrites_and_reports_failures() {
        let fm = manager();
        fm.transport().add_file("/up/a.txt", b"old".to_vec());
        fm.transport().fail(Method::Put, "/up/b.txt", 507);
        let files = vec![
            UploadFile::new("a.txt", b"new".to_vec()),
            UploadFile::new("b.txt", b"b".to_vec()),
        ];
        let report = fm
            .upload_files(&writable(), "/up/", files, Rc::new(|_: &UploadProgress| {}))
            .await
            .unwrap();
        assert_eq!(report.to_string(), "1 succeeded, 1 failed");
        assert_eq!(report.errors[0].0, "b.txt");
        assert_eq!(fm.transport().file_data("/up/a.txt"), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_upload_hands_body_to_transport_unchanged() {
        let fm = manager();
        let file = UploadFile::new("big.bin", vec![7u8; 4096]);
        assert_eq!(file.size(), 4096);
        let seen: Rc<RefCell<Vec<u64>>> = Rc::default();
        let observer: ProgressObserver = {
            let seen = Rc::clone(&seen);
            Rc::new(move |p: &UploadProgress| seen.borrow_mut().push(p.total_bytes))
        };

        fm.upload_files(&writable(), "/up/", vec![file], observer)
            .await
            .unwrap();
        let put = fm.transport().last_request().unwrap();
        assert_eq!(put.body, Some(Body::Bytes(vec![7u8; 4096])));
        // Size is known before the request starts
        assert_eq!(seen.borrow().first(), Some(&4096));
    }
}
