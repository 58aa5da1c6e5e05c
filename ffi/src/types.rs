//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Optional strings are null when
//! absent. JSON objects (`source`, `meta`, `links`) cross as JSON text so
//! the host can decode them with its own JSON library. Conversion and
//! release helpers live here to keep `lib.rs` focused on the `extern "C"`
//! surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

use jadugar_core::{Client, Headers, HttpMethod, HttpResponse, NormalizedError, TransportFailure};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::transport::UreqTransport;

/// Opaque handle to a mobile `Client`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiJadugarClient {
    pub(crate) inner: Arc<Client<UreqTransport>>,
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Copy `s` into a C string owned by the caller. Interior NULs are dropped.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', "")).map_or(ptr::null_mut(), CString::into_raw)
}

pub(crate) fn opt_c_string(s: Option<&str>) -> *mut c_char {
    s.map_or(ptr::null_mut(), to_c_string)
}

fn json_c_string(object: Option<&Map<String, Value>>) -> *mut c_char {
    object
        .and_then(|o| serde_json::to_string(o).ok())
        .map_or(ptr::null_mut(), |s| to_c_string(&s))
}

/// Read a caller-owned C string. Null yields `None`; invalid UTF-8 is
/// replaced lossily.
pub(crate) fn read_c_str(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
}

/// Release a C string created by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
    Head = 5,
    Options = 6,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Options => FfiHttpMethod::Options,
        }
    }
}

/// A single HTTP header owned by this library.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A single HTTP header supplied by the caller. Read, never freed.
#[repr(C)]
pub struct FfiHeaderRef {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// A built request. The host executes it and reports back through
/// `jadugar_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: jadugar_core::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(&k),
                    value: to_c_string(&v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: to_c_string(&req.url),
            headers,
            headers_len,
            body: opt_c_string(req.body.as_deref()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// What the host observed after executing a request.
///
/// The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    /// Non-null when the exchange failed before any response arrived; holds
    /// the platform's error description.
    pub transport_error: *const c_char,
    /// HTTP status code. Zero means the host got something that is not an
    /// HTTP response.
    pub status: u16,
    /// Response payload; null when none could be read.
    pub body: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> Result<HttpResponse, TransportFailure> {
        if let Some(detail) = read_c_str(self.transport_error) {
            return Err(TransportFailure::Network(detail));
        }
        if self.status == 0 {
            return Err(TransportFailure::InvalidResponse);
        }
        Ok(HttpResponse {
            status: self.status,
            headers: Headers::new(),
            body: read_c_str(self.body),
        })
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A `NormalizedError` exposed to C. Every string is owned by the library
/// and released together with the error.
#[repr(C)]
pub struct FfiError {
    pub status: u16,
    pub code: *mut c_char,
    pub title: *mut c_char,
    pub id: *mut c_char,
    pub detail: *mut c_char,
    pub source_json: *mut c_char,
    pub meta_json: *mut c_char,
    pub links_json: *mut c_char,
    pub handling_guide: *mut c_char,
    pub recovery_suggestion: *mut c_char,
}

impl FfiError {
    pub(crate) fn from_core(err: &NormalizedError) -> *mut Self {
        Box::into_raw(Box::new(FfiError {
            status: err.status(),
            code: to_c_string(err.code()),
            title: to_c_string(err.title()),
            id: opt_c_string(err.id()),
            detail: opt_c_string(err.detail()),
            source_json: json_c_string(err.error_source()),
            meta_json: json_c_string(err.meta()),
            links_json: json_c_string(err.links()),
            handling_guide: opt_c_string(err.handling_guide()),
            recovery_suggestion: opt_c_string(err.recovery_suggestion()),
        }))
    }

    /// Release an error created by `from_core`. Null is ignored.
    pub(crate) fn free(err: *mut Self) {
        if err.is_null() {
            return;
        }
        let err = unsafe { Box::from_raw(err) };
        for s in [
            err.code,
            err.title,
            err.id,
            err.detail,
            err.source_json,
            err.meta_json,
            err.links_json,
            err.handling_guide,
            err.recovery_suggestion,
        ] {
            free_c_string(s);
        }
    }
}

/// A success body that has been checked to be JSON but is otherwise left
/// exactly as the server sent it.
pub(crate) type Payload = Box<RawValue>;

/// Outcome of one request.
///
/// On success `error` is null and `data` holds the response body text,
/// untouched. On failure `data` is null and `error` describes it.
#[repr(C)]
pub struct FfiResult {
    pub error: *mut FfiError,
    pub data: *mut c_char,
}

impl FfiResult {
    pub(crate) fn from_outcome(outcome: Result<Payload, NormalizedError>) -> *mut Self {
        match outcome {
            Ok(payload) => Box::into_raw(Box::new(FfiResult {
                error: ptr::null_mut(),
                data: to_c_string(payload.get()),
            })),
            Err(err) => Self::error(&err),
        }
    }

    pub(crate) fn error(err: &NormalizedError) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error: FfiError::from_core(err),
            data: ptr::null_mut(),
        }))
    }
}
