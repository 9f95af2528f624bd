//! JSON listing protocol: `GET <dir>?__list=1`.

use log::debug;
use serde::Deserialize;

use crate::config::LIST_QUERY_PARAM;
use crate::core::error::AdapterError;
use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::DirectoryItem;
use crate::utils::format::format_http_date;
use crate::utils::path::{encode_segment, join_path};

/// Listing body returned by the backend.
#[derive(Debug, Deserialize)]
struct JsonListing {
    #[serde(default)]
    items: Vec<JsonItem>,
}

/// One listing entry. `mtime` is Unix seconds.
#[derive(Debug, Deserialize)]
struct JsonItem {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "isDir")]
    is_dir: bool,
    #[serde(default)]
    size: Option<f64>,
    #[serde(default)]
    mtime: Option<f64>,
}

/// URL of the JSON listing for `dir_path`.
pub fn listing_url(dir_path: &str) -> String {
    let sep = if dir_path.contains('?') { '&' } else { '?' };
    format!("{}{}{}=1", dir_path, sep, LIST_QUERY_PARAM)
}

/// Fetch and parse the JSON listing of `dir_path`.
pub async fn list_by_json<T: Transport>(
    transport: &T,
    dir_path: &str,
) -> Result<Vec<DirectoryItem>, AdapterError> {
    let response = transport
        .send(HttpRequest::new(Method::Get, listing_url(dir_path)))
        .await?;
    if !response.is_ok() {
        return Err(AdapterError::Http(response.status));
    }
    let items = parse_json_listing(&response.body, dir_path)?;
    debug!("json listing of {} returned {} items", dir_path, items.len());
    Ok(items)
}

/// Convert a JSON listing body into items, keeping the server's order.
pub fn parse_json_listing(body: &[u8], dir_path: &str) -> Result<Vec<DirectoryItem>, AdapterError> {
    let listing: JsonListing =
        serde_json::from_slice(body).map_err(|e| AdapterError::Parse(e.to_string()))?;

    Ok(listing
        .items
        .into_iter()
        .filter_map(|item| {
            let name = item.name.trim_end_matches('/').to_string();
            if name.is_empty() {
                return None;
            }
            let mut href = join_path(dir_path, &encode_segment(&name));
            if item.is_dir {
                href.push('/');
            }
            let size = item.size.filter(|s| *s >= 0.0).map(|s| s as u64);
            let mtime = item
                .mtime
                .filter(|t| *t > 0.0)
                .and_then(|t| format_http_date(t as i64));
            Some(
                DirectoryItem::new(name, item.is_dir, href)
                    .with_size(size)
                    .with_mtime(mtime),
            )
        })
        .collect())
}
