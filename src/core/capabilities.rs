//! Write-capability discovery via `OPTIONS`.

use log::{debug, warn};

use crate::core::transport::{HttpRequest, Method, Transport};
use crate::models::Capabilities;

/// Ask the server which methods `path` accepts.
///
/// Never fails: a network error yields [`Capabilities::default`], which
/// keeps every write action hidden.
pub async fn probe_capabilities<T: Transport>(transport: &T, path: &str) -> Capabilities {
    match transport.send(HttpRequest::new(Method::Options, path)).await {
        Ok(response) => {
            let caps = capabilities_from_headers(
                response.header_value("Allow"),
                response.header_value("DAV"),
            );
            debug!("capabilities of {}: {:?}", path, caps);
            caps
        }
        Err(e) => {
            warn!("OPTIONS {} failed, assuming read-only: {}", path, e);
            Capabilities::default()
        }
    }
}

/// Derive capability flags from `Allow` and `DAV` header values.
pub fn capabilities_from_headers(allow: Option<&str>, dav: Option<&str>) -> Capabilities {
    let methods: Vec<String> = allow
        .unwrap_or_default()
        .split(',')
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .collect();
    let allows = |method: &str| methods.iter().any(|m| m == method);

    let is_webdav = dav
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .any(|class| class == "1" || class == "2");

    Capabilities {
        supports_put: allows("PUT"),
        supports_move: allows("MOVE"),
        supports_delete: allows("DELETE"),
        supports_mkcol: allows("MKCOL"),
        supports_copy: allows("COPY"),
        is_webdav,
    }
}
