//! C-ABI wrapper around `jadugar-core` for mobile hosts.
//!
//! # Overview
//! Exposes the Jadugar client through `extern "C"` functions. Requests are
//! tagged with the mobile platform of the build target (`ios`, or
//! `android` when compiled for Android). Two calling styles are offered:
//!
//! - host does I/O: `jadugar_build_request` produces the request, the host
//!   executes it with its native HTTP stack and hands the outcome to
//!   `jadugar_parse_response`;
//! - completion callback: `jadugar_request` performs the exchange on a
//!   background thread and invokes the callback exactly once.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Failures always arrive as an `FfiError` built from a `NormalizedError`.
//! - The C caller owns all returned pointers and must call the matching
//!   `jadugar_free_*` function to release them.

pub mod transport;
pub mod types;

use std::ffi::c_void;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::Arc;
use std::thread;

use jadugar_core::{
    normalize_failure, parse_response, Client, ClientConfig, HttpMethod, NormalizedError,
    Platform, RequestOptions,
};
use transport::UreqTransport;
use types::*;

pub const NULL_ARGUMENT: &str = "NULL_ARGUMENT";
pub const INVALID_METHOD: &str = "INVALID_METHOD";
pub const INTERNAL_PANIC: &str = "INTERNAL_PANIC";

/// Completion callback for `jadugar_request`. Receives ownership of the
/// result (release it with `jadugar_free_result`) and the caller's
/// `user_data` pointer, untouched.
pub type JadugarCompletion = extern "C" fn(result: *mut FfiResult, user_data: *mut c_void);

fn null_argument(name: &str) -> NormalizedError {
    NormalizedError::synthesize(400, NULL_ARGUMENT, "Null argument", Some(format!("null argument: {name}")))
}

fn internal_panic(function: &str) -> NormalizedError {
    NormalizedError::synthesize(500, INTERNAL_PANIC, "Internal error", Some(format!("panic in {function}")))
}

/// Collect method, body and extra headers from caller-owned pointers.
fn request_options(
    method: *const c_char,
    body: *const c_char,
    headers: *const FfiHeaderRef,
    headers_len: u32,
) -> Result<RequestOptions, NormalizedError> {
    let mut options = RequestOptions::new();
    if let Some(method) = read_c_str(method) {
        let method: HttpMethod = method.parse().map_err(|e| {
            NormalizedError::synthesize(400, INVALID_METHOD, "Invalid method", Some(format!("{e}")))
        })?;
        options = options.method(method);
    }
    if let Some(body) = read_c_str(body) {
        options = options.body(body);
    }
    if headers_len > 0 {
        if headers.is_null() {
            return Err(null_argument("headers"));
        }
        let headers = unsafe { std::slice::from_raw_parts(headers, headers_len as usize) };
        for header in headers {
            let key = read_c_str(header.key).ok_or_else(|| null_argument("headers.key"))?;
            let value = read_c_str(header.value).ok_or_else(|| null_argument("headers.value"))?;
            options = options.header(key, value);
        }
    }
    Ok(options)
}

/// Lets the caller's opaque pointer travel to the request thread. The
/// library never dereferences it.
#[derive(Clone, Copy)]
struct UserData(*mut c_void);

unsafe impl Send for UserData {}

impl UserData {
    fn into_inner(self) -> *mut c_void {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`.
///
/// `api_key` and `version` may be null; the version then defaults to
/// "1.0.0". Returns null if `base_url` is null or an internal panic occurs.
/// The caller must free the returned pointer with `jadugar_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
    version: *const c_char,
) -> *mut FfiJadugarClient {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(base_url) = read_c_str(base_url) else {
            return ptr::null_mut();
        };
        let mut config = ClientConfig::new(&base_url, Platform::mobile());
        if let Some(key) = read_c_str(api_key) {
            config = config.with_api_key(key);
        }
        if let Some(version) = read_c_str(version) {
            config = config.with_version(version);
        }
        let client = Client::new(config, UreqTransport::new());
        Box::into_raw(Box::new(FfiJadugarClient {
            inner: Arc::new(client),
        }))
    }))
    .unwrap_or(ptr::null_mut())
}

/// Free a client created by `jadugar_client_new`. Safe to call with null.
/// Requests already dispatched with `jadugar_request` keep running.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_client_free(client: *mut FfiJadugarClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Host does I/O
// ---------------------------------------------------------------------------

/// Build the request for `endpoint`.
///
/// `method` (e.g. "POST", case-insensitive) and `body` may be null; the
/// method then defaults to GET. `headers` points to `headers_len` extra
/// headers that replace the standard ones on a name collision.
///
/// Returns null on failure and, when `out_error` is non-null, stores an
/// `FfiError` there (e.g. `INVALID_URL`) that the caller must free with
/// `jadugar_free_error`. On success the caller must free the request with
/// `jadugar_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_build_request(
    client: *const FfiJadugarClient,
    endpoint: *const c_char,
    method: *const c_char,
    body: *const c_char,
    headers: *const FfiHeaderRef,
    headers_len: u32,
    out_error: *mut *mut FfiError,
) -> *mut FfiHttpRequest {
    let built = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return Err(null_argument("client"));
        }
        let endpoint = read_c_str(endpoint).ok_or_else(|| null_argument("endpoint"))?;
        let options = request_options(method, body, headers, headers_len)?;
        let client = unsafe { &*client };
        client.inner.build_request(&endpoint, options)
    }))
    .unwrap_or_else(|_| Err(internal_panic("jadugar_build_request")));

    match built {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(err) => {
            if !out_error.is_null() {
                unsafe { *out_error = FfiError::from_core(&err) };
            }
            ptr::null_mut()
        }
    }
}

/// Classify what the host observed after executing a built request.
///
/// Never returns null. The caller must free the result with
/// `jadugar_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_parse_response(response: *const FfiHttpResponse) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        if response.is_null() {
            return FfiResult::error(&null_argument("response"));
        }
        let outcome = unsafe { &*response }.to_core();
        FfiResult::from_outcome(parse_response::<Payload>(outcome))
    }))
    .unwrap_or_else(|_| FfiResult::error(&internal_panic("jadugar_parse_response")))
}

// ---------------------------------------------------------------------------
// Completion callback
// ---------------------------------------------------------------------------

/// Send a request on a background thread and report through `completion`.
///
/// `completion` is invoked exactly once: on the calling thread when the
/// arguments are unusable, otherwise on the request thread. Nothing happens
/// if `completion` is null. All string arguments are copied before this
/// function returns.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_request(
    client: *const FfiJadugarClient,
    endpoint: *const c_char,
    method: *const c_char,
    body: *const c_char,
    headers: *const FfiHeaderRef,
    headers_len: u32,
    completion: Option<JadugarCompletion>,
    user_data: *mut c_void,
) {
    let Some(completion) = completion else {
        return;
    };
    let user_data = UserData(user_data);

    let prepared = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return Err(null_argument("client"));
        }
        let endpoint = read_c_str(endpoint).ok_or_else(|| null_argument("endpoint"))?;
        let options = request_options(method, body, headers, headers_len)?;
        let client = unsafe { &*client };
        Ok((Arc::clone(&client.inner), endpoint, options))
    }))
    .unwrap_or_else(|_| Err(internal_panic("jadugar_request")));

    let (client, endpoint, options) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            completion(FfiResult::error(&err), user_data.into_inner());
            return;
        }
    };

    let spawned = thread::Builder::new()
        .name("jadugar-request".to_string())
        .spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| client.request::<Payload>(&endpoint, options)))
                .unwrap_or_else(|_| Err(internal_panic("jadugar_request")));
            completion(FfiResult::from_outcome(outcome), user_data.into_inner());
        });

    if let Err(err) = spawned {
        tracing::debug!(%err, "could not start request thread");
        let err = normalize_failure(Box::new(err));
        completion(FfiResult::error(&err), user_data.into_inner());
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `jadugar_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }));
}

/// Free an `FfiResult` from `jadugar_parse_response` or a completion
/// callback, including its error or data. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        FfiError::free(result.error);
        free_c_string(result.data);
    }));
}

/// Free an `FfiError` stored through `out_error`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_free_error(err: *mut FfiError) {
    let _ = catch_unwind(AssertUnwindSafe(|| FfiError::free(err)));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jadugar_free_string(s: *mut c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
