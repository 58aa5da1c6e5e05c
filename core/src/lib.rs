//! Platform-agnostic core of the Jadugar client SDKs.
//!
//! # Overview
//! Builds requests with the standard Jadugar headers, classifies the
//! outcome of an exchange, and normalizes every failure into one
//! `NormalizedError`. The I/O itself sits behind the `Transport` trait (or
//! is done by the host across the FFI boundary), which keeps this crate
//! deterministic and easy to test.
//!
//! # Design
//! - `RequestBuilder` validates the URL up front and merges default and
//!   caller headers; the request id source is injected.
//! - `parse_response` is the single classification routine: network
//!   failure, invalid response, missing body, error envelope, decode.
//! - `normalize` is the only constructor of `NormalizedError`.
//! - Adapters (`jadugar-web`, `jadugar-ffi`) fix the platform tag and pick
//!   the calling style; the blocking `Client` is the plain-Rust surface.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod request_id;
pub mod response;

pub use client::Client;
pub use config::{ClientConfig, ConfigError, Platform};
pub use error::{codes, normalize, normalize_failure, NormalizedError};
pub use http::{Headers, HttpMethod, HttpRequest, HttpResponse, Transport, TransportFailure};
pub use request::{RequestBuilder, RequestOptions};
pub use request_id::{RequestIdSource, SeededIds, ThreadRngIds};
pub use response::parse_response;
