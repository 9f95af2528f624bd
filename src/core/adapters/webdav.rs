//! WebDAV listing protocol: `PROPFIND` with `Depth: 1`.
//!
//! Element lookup ignores namespace prefixes, so `D:href`, `d:href` and
//! `lp1:getlastmodified` all match.

use std::collections::HashMap;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::config::{PROPFIND_BODY, PROPFIND_CONTENT_TYPE};
use crate::core::error::AdapterError;
use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::{DirectoryItem, sort_items};
use crate::utils::path::{decode_segment, is_same_path, last_segment, normalize_href};

/// Properties collected from one `<response>` element.
#[derive(Debug, Default, PartialEq)]
struct DavResponse {
    href: String,
    display_name: String,
    content_length: String,
    last_modified: String,
    is_collection: bool,
}

/// Text-bearing element currently being read.
#[derive(Clone, Copy, PartialEq)]
enum Field {
    Href,
    DisplayName,
    ContentLength,
    LastModified,
}

/// Fetch and parse the PROPFIND listing of `base_path`.
pub async fn list_by_webdav<T: Transport>(
    transport: &T,
    base_path: &str,
    origin: &str,
) -> Result<Vec<DirectoryItem>, AdapterError> {
    let request = HttpRequest::new(Method::Propfind, base_path)
        .header("Depth", "1")
        .header("Content-Type", PROPFIND_CONTENT_TYPE)
        .body(PROPFIND_BODY);
    let response = transport.send(request).await?;
    if !response.is_ok() {
        return Err(AdapterError::Http(response.status));
    }
    let items = parse_multistatus(&response.text(), base_path, origin)?;
    debug!("propfind of {} returned {} items", base_path, items.len());
    Ok(items)
}

/// Convert a multistatus document into sorted items, skipping the entry for
/// `base_path` itself.
pub fn parse_multistatus(
    xml: &str,
    base_path: &str,
    origin: &str,
) -> Result<Vec<DirectoryItem>, AdapterError> {
    let mut by_href: HashMap<String, DirectoryItem> = HashMap::new();

    for response in read_responses(xml)? {
        let mut href = normalize_href(response.href.trim(), origin);
        if href.is_empty() || is_same_path(&href, base_path) {
            continue;
        }

        let name = if response.display_name.is_empty() {
            decode_segment(last_segment(&href))
        } else {
            decode_segment(&response.display_name)
        };
        let is_dir = response.is_collection || href.ends_with('/');
        if is_dir && !href.ends_with('/') {
            href.push('/');
        }
        let size = if response.is_collection {
            None
        } else {
            response.content_length.trim().parse::<u64>().ok()
        };
        let mtime = Some(response.last_modified.trim().to_string()).filter(|s| !s.is_empty());

        let item = DirectoryItem::new(name, is_dir, href.clone())
            .with_size(size)
            .with_mtime(mtime);
        by_href.insert(href, item);
    }

    let mut items: Vec<DirectoryItem> = by_href.into_values().collect();
    sort_items(&mut items);
    Ok(items)
}

/// Pull every `<response>` out of a multistatus document.
///
/// Only the first `<propstat>` of a response is read; servers put the
/// `404 Not Found` block for missing properties after the `200 OK` one.
fn read_responses(xml: &str) -> Result<Vec<DavResponse>, AdapterError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut responses = Vec::new();
    let mut current: Option<DavResponse> = None;
    let mut field: Option<Field> = None;
    let mut propstat_count = 0usize;
    let mut in_resource_type = false;
    let mut saw_multistatus = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"multistatus" => saw_multistatus = true,
                    b"response" => {
                        current = Some(DavResponse::default());
                        propstat_count = 0;
                    }
                    b"propstat" => propstat_count += 1,
                    b"resourcetype" if propstat_count <= 1 => in_resource_type = true,
                    b"collection" if in_resource_type => {
                        if let Some(r) = current.as_mut() {
                            r.is_collection = true;
                        }
                    }
                    tag => field = text_field(tag, current.as_ref(), propstat_count),
                }
            }
            Ok(Event::Empty(e)) => {
                if in_resource_type && e.local_name().as_ref() == b"collection" {
                    if let Some(r) = current.as_mut() {
                        r.is_collection = true;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(f), Some(r)) = (field, current.as_mut()) {
                    let text = t.unescape().map_err(|e| AdapterError::Parse(e.to_string()))?;
                    push_text(r, f, &text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(f), Some(r)) = (field, current.as_mut()) {
                    push_text(r, f, &String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"response" => {
                    if let Some(r) = current.take() {
                        responses.push(r);
                    }
                    field = None;
                }
                b"resourcetype" => in_resource_type = false,
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(AdapterError::Parse(e.to_string())),
            _ => {}
        }
    }

    if !saw_multistatus {
        return Err(AdapterError::Parse("no multistatus element".to_string()));
    }
    Ok(responses)
}

/// Which text field an opening tag starts, if any.
fn text_field(tag: &[u8], current: Option<&DavResponse>, propstat_count: usize) -> Option<Field> {
    let current = current?;
    match tag {
        b"href" if current.href.is_empty() => Some(Field::Href),
        b"displayname" if propstat_count <= 1 => Some(Field::DisplayName),
        b"getcontentlength" if propstat_count <= 1 => Some(Field::ContentLength),
        b"getlastmodified" if propstat_count <= 1 => Some(Field::LastModified),
        _ => None,
    }
}

fn push_text(response: &mut DavResponse, field: Field, text: &str) {
    let target = match field {
        Field::Href => &mut response.href,
        Field::DisplayName => &mut response.display_name,
        Field::ContentLength => &mut response.content_length,
        Field::LastModified => &mut response.last_modified,
    };
    target.push_str(text);
}
