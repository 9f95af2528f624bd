//! Browser [`Transport`] built on the Fetch API.
//!
//! Requests carry cookies (`credentials: include`). Uploads go through
//! `XMLHttpRequest` instead, since fetch cannot report upload progress.
//! File bodies are passed to the browser as `Blob`s and never copied into
//! WASM memory.
//! No timeouts are raced against requests.

use js_sys::{Array, Promise, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    ProgressEvent, Request, RequestCredentials, RequestInit, RequestMode, Response, XmlHttpRequest,
};

use crate::core::error::FetchError;
use crate::core::transport::{
    Body, Headers, HttpRequest, HttpResponse, Method, ProgressFn, Transport,
};

/// [`Transport`] backed by `window.fetch`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let window = web_sys::window().ok_or(FetchError::NoWindow)?;

        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_credentials(RequestCredentials::Include);

        let headers = web_sys::Headers::new().map_err(|_| FetchError::RequestCreationFailed)?;
        for (name, value) in request.headers.iter() {
            headers
                .append(name, value)
                .map_err(|_| FetchError::RequestCreationFailed)?;
        }
        opts.set_headers(&headers);
        match &request.body {
            Some(Body::Bytes(bytes)) => opts.set_body(&Uint8Array::from(bytes.as_slice())),
            Some(Body::Blob(blob)) => opts.set_body(blob),
            None => {}
        }

        let js_request = Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|_| FetchError::RequestCreationFailed)?;
        let result = JsFuture::from(window.fetch_with_request(&js_request))
            .await
            .map_err(|e| FetchError::NetworkError(js_message(&e)))?;
        let response: Response = result.dyn_into().map_err(|_| FetchError::InvalidContent)?;

        let body = if request.method == Method::Head {
            Vec::new()
        } else {
            let buffer = JsFuture::from(
                response
                    .array_buffer()
                    .map_err(|_| FetchError::ResponseReadFailed)?,
            )
            .await
            .map_err(|_| FetchError::ResponseReadFailed)?;
            Uint8Array::new(&buffer).to_vec()
        };

        Ok(HttpResponse {
            status: response.status(),
            headers: read_headers(&response.headers()),
            body,
        })
    }

    async fn send_with_progress(
        &self,
        request: HttpRequest,
        on_progress: ProgressFn,
    ) -> Result<HttpResponse, FetchError> {
        let xhr = XmlHttpRequest::new().map_err(|_| FetchError::RequestCreationFailed)?;
        xhr.open_with_async(request.method.as_str(), &request.url, true)
            .map_err(|_| FetchError::RequestCreationFailed)?;
        xhr.set_with_credentials(true);
        for (name, value) in request.headers.iter() {
            xhr.set_request_header(name, value)
                .map_err(|_| FetchError::RequestCreationFailed)?;
        }

        let upload = xhr.upload().map_err(|_| FetchError::RequestCreationFailed)?;
        let progress_cb = {
            let on_progress = on_progress.clone();
            Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
                if event.length_computable() {
                    on_progress(event.loaded() as u64);
                }
            })
        };
        upload.set_onprogress(Some(progress_cb.as_ref().unchecked_ref()));

        let done = Promise::new(&mut |resolve, reject| {
            xhr.set_onload(Some(&resolve));
            xhr.set_onerror(Some(&reject));
            xhr.set_onabort(Some(&reject));
        });

        let total = request.body.as_ref().map_or(0, Body::len);
        // Blobs are streamed from disk by the browser
        let sent = match &request.body {
            Some(Body::Blob(blob)) => xhr.send_with_opt_blob(Some(blob)),
            Some(Body::Bytes(bytes)) => {
                xhr.send_with_opt_buffer_source(Some(&Uint8Array::from(bytes.as_slice())))
            }
            None => xhr.send(),
        };
        sent.map_err(|e| FetchError::NetworkError(js_message(&e)))?;

        let outcome = JsFuture::from(done).await;
        upload.set_onprogress(None);
        drop(progress_cb);
        outcome.map_err(|_| FetchError::NetworkError("upload interrupted".to_string()))?;

        let status = xhr.status().map_err(|_| FetchError::InvalidContent)?;
        on_progress(total);
        let raw_headers = xhr.get_all_response_headers().unwrap_or_default();
        Ok(HttpResponse {
            status,
            headers: parse_header_block(&raw_headers),
            body: Vec::new(),
        })
    }
}

/// Collect a fetch `Headers` object into our own header list.
fn read_headers(headers: &web_sys::Headers) -> Headers {
    let mut out = Headers::new();
    let Ok(Some(entries)) = js_sys::try_iter(headers.as_ref()) else {
        return out;
    };
    for entry in entries.flatten() {
        let pair: Array = entry.unchecked_into();
        if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            out.append(name, value);
        }
    }
    out
}

/// Parse the CRLF-separated block returned by `getAllResponseHeaders()`.
fn parse_header_block(raw: &str) -> Headers {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}
