//! File contents for the preview pane.

use log::debug;

use crate::config::PREVIEW_MAX_BYTES;
use crate::core::error::PreviewError;
use crate::core::orchestrator::FileManager;
use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::{DirectoryItem, FileType};

/// Downloaded head of a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
    pub file_type: FileType,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// Size reported by `HEAD`, if any.
    pub total_size: Option<u64>,
    /// Only the first [`PREVIEW_MAX_BYTES`] were requested.
    pub truncated: bool,
}

impl Preview {
    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl<T: Transport> FileManager<T> {
    /// Fetch `item` for preview, ranged when it is larger than
    /// [`PREVIEW_MAX_BYTES`].
    pub async fn fetch_preview(&self, item: &DirectoryItem) -> Result<Preview, PreviewError> {
        let file_type = item.file_type();
        if !file_type.is_previewable() {
            return Err(PreviewError::NotPreviewable(item.name.clone()));
        }

        let total_size = match item.size {
            Some(size) => Some(size),
            None => self.head(&item.href).await.and_then(|info| info.size),
        };
        let truncated = total_size.is_some_and(|size| size > PREVIEW_MAX_BYTES);

        let mut request = HttpRequest::new(Method::Get, item.href.as_str());
        if truncated {
            request = request.header("Range", format!("bytes=0-{}", PREVIEW_MAX_BYTES - 1));
        }
        let response = self.transport().send(request).await?;
        if !response.is_ok() {
            return Err(PreviewError::Http(response.status));
        }
        debug!(
            "preview of {}: {} bytes (truncated: {})",
            item.href,
            response.body.len(),
            truncated
        );

        Ok(Preview {
            file_type,
            content_type: response.header_value("Content-Type").map(str::to_string),
            // Servers that ignore Range still send everything
            truncated: truncated || response.status == 206,
            bytes: response.body,
            total_size,
        })
    }
}
