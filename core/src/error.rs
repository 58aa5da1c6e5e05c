//! The canonical Jadugar error and the normalizer that builds it.
//!
//! # Design
//! Every failure, whether it came from the server's JSON:API error envelope
//! or was detected locally (bad URL, network failure, undecodable body),
//! ends up as one `NormalizedError`. Local failures are first written as an
//! error-object mapping and then run through the same `normalize` function
//! as server errors, so there is exactly one construction path.
//!
//! Extraction is defensive: each field is read and defaulted on its own,
//! and fields of the wrong JSON type are treated as absent.

use std::error::Error;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Error codes produced by the client itself. Codes sent by the server are
/// carried through verbatim and need not appear here.
pub mod codes {
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
    pub const NO_DATA: &str = "NO_DATA";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
}

pub const DEFAULT_STATUS: u16 = 500;
pub const DEFAULT_TITLE: &str = "Unknown error occurred";

/// The single error shape handed to callers.
///
/// Serializes with camelCase keys and an `isJadugarError: true` marker so
/// hosts receiving it as JSON can tell it apart from arbitrary failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    is_jadugar_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    status: u16,
    code: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handling_guide: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recovery_suggestion: Option<String>,
}

impl NormalizedError {
    /// Build an error for a condition that never reached the wire.
    pub fn synthesize(status: u16, code: &str, title: &str, detail: Option<String>) -> Self {
        let mut object = json!({
            "status": status.to_string(),
            "code": code,
            "title": title,
        });
        if let Some(detail) = detail {
            object["detail"] = Value::String(detail);
        }
        normalize(&object)
    }

    /// Always `true`; lets serialized errors identify themselves.
    pub fn is_jadugar_error(&self) -> bool {
        self.is_jadugar_error
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The JSON:API `source` object, e.g. `{"pointer": "/data/name"}`.
    pub fn error_source(&self) -> Option<&Map<String, Value>> {
        self.source.as_ref()
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }

    pub fn links(&self) -> Option<&Map<String, Value>> {
        self.links.as_ref()
    }

    pub fn handling_guide(&self) -> Option<&str> {
        self.handling_guide.as_deref()
    }

    pub fn recovery_suggestion(&self) -> Option<&str> {
        self.recovery_suggestion.as_deref()
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Error for NormalizedError {}

/// Build a `NormalizedError` from one JSON:API error object.
///
/// Never fails: missing `status`, `code` and `title` fall back to
/// `DEFAULT_STATUS`, `UNKNOWN_ERROR` and `DEFAULT_TITLE`. A non-object input
/// yields an error made entirely of defaults.
pub fn normalize(error_object: &Value) -> NormalizedError {
    let platform_specific = error_object
        .pointer("/meta/platform_specific")
        .and_then(Value::as_object);

    NormalizedError {
        is_jadugar_error: true,
        id: string_field(error_object, "id"),
        status: parse_status(error_object.get("status")),
        code: string_field(error_object, "code").unwrap_or_else(|| codes::UNKNOWN_ERROR.to_string()),
        title: string_field(error_object, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        detail: string_field(error_object, "detail"),
        source: object_field(error_object, "source"),
        meta: object_field(error_object, "meta"),
        links: object_field(error_object, "links"),
        handling_guide: platform_specific
            .and_then(|p| p.get("handling_guide"))
            .and_then(Value::as_str)
            .map(str::to_string),
        recovery_suggestion: platform_specific
            .and_then(|p| p.get("recovery_suggestion"))
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Turn an arbitrary failure into a `NormalizedError`.
///
/// A `NormalizedError` passes through untouched. Anything else is reported
/// as `NETWORK_ERROR` with the failure's message as detail.
pub fn normalize_failure(err: Box<dyn Error + Send + Sync + 'static>) -> NormalizedError {
    match err.downcast::<NormalizedError>() {
        Ok(normalized) => *normalized,
        Err(other) => NormalizedError::synthesize(
            DEFAULT_STATUS,
            codes::NETWORK_ERROR,
            "Network request failed",
            Some(other.to_string()),
        ),
    }
}

/// Status travels as a string on the wire; bare integers are accepted too.
fn parse_status(value: Option<&Value>) -> u16 {
    let status = match value {
        Some(Value::String(s)) => s.parse::<u16>().ok(),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        _ => None,
    };
    status.unwrap_or(DEFAULT_STATUS)
}

fn string_field(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn object_field(object: &Value, key: &str) -> Option<Map<String, Value>> {
    object.get(key).and_then(Value::as_object).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_error_object() {
        let err = normalize(&json!({
            "id": "err-1",
            "status": "422",
            "code": "VALIDATION_FAILED",
            "title": "Invalid name",
            "detail": "name must not be empty",
            "source": {"pointer": "/data/attributes/name"},
            "meta": {"platform_specific": {
                "handling_guide": "Highlight the name field",
                "recovery_suggestion": "Enter a name"
            }},
            "links": {"about": "https://docs.jadugar.com/errors/validation"}
        }));

        assert!(err.is_jadugar_error());
        assert_eq!(err.id(), Some("err-1"));
        assert_eq!(err.status(), 422);
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(err.title(), "Invalid name");
        assert_eq!(err.detail(), Some("name must not be empty"));
        assert_eq!(err.error_source().unwrap()["pointer"], "/data/attributes/name");
        assert_eq!(err.handling_guide(), Some("Highlight the name field"));
        assert_eq!(err.recovery_suggestion(), Some("Enter a name"));
        assert_eq!(
            err.links().unwrap()["about"],
            "https://docs.jadugar.com/errors/validation"
        );
        assert_eq!(err.to_string(), "Invalid name");
    }

    #[test]
    fn empty_object_gets_defaults() {
        let err = normalize(&json!({}));
        assert_eq!(err.status(), 500);
        assert_eq!(err.code(), "UNKNOWN_ERROR");
        assert_eq!(err.title(), "Unknown error occurred");
        assert_eq!(err.id(), None);
        assert_eq!(err.detail(), None);
        assert_eq!(err.handling_guide(), None);
    }

    #[test]
    fn non_object_gets_defaults() {
        let err = normalize(&json!(["not", "an", "object"]));
        assert_eq!(err.status(), 500);
        assert_eq!(err.code(), "UNKNOWN_ERROR");
    }

    #[test]
    fn unparsable_status_defaults_to_500() {
        assert_eq!(normalize(&json!({"status": "teapot"})).status(), 500);
        assert_eq!(normalize(&json!({"status": "404 "})).status(), 500);
        assert_eq!(normalize(&json!({"status": "70000"})).status(), 500);
        assert_eq!(normalize(&json!({"status": -1})).status(), 500);
        assert_eq!(normalize(&json!({"status": null})).status(), 500);
    }

    #[test]
    fn integer_status_is_accepted() {
        assert_eq!(normalize(&json!({"status": 403})).status(), 403);
    }

    #[test]
    fn wrongly_typed_fields_are_absent() {
        let err = normalize(&json!({"code": 12, "title": false, "meta": "x", "source": []}));
        assert_eq!(err.code(), "UNKNOWN_ERROR");
        assert_eq!(err.title(), "Unknown error occurred");
        assert!(err.meta().is_none());
        assert!(err.error_source().is_none());
    }

    #[test]
    fn guide_without_suggestion() {
        let err = normalize(&json!({
            "meta": {"platform_specific": {"handling_guide": "Retry later"}}
        }));
        assert_eq!(err.handling_guide(), Some("Retry later"));
        assert_eq!(err.recovery_suggestion(), None);
        assert!(err.meta().is_some());
    }

    #[test]
    fn suggestion_without_guide() {
        let err = normalize(&json!({
            "meta": {"platform_specific": {"recovery_suggestion": "Sign in again"}}
        }));
        assert_eq!(err.handling_guide(), None);
        assert_eq!(err.recovery_suggestion(), Some("Sign in again"));
    }

    #[test]
    fn meta_without_platform_specific() {
        let err = normalize(&json!({"meta": {"trace": "abc"}}));
        assert_eq!(err.meta().unwrap()["trace"], "abc");
        assert_eq!(err.handling_guide(), None);
        assert_eq!(err.recovery_suggestion(), None);
    }

    #[test]
    fn synthesize_keeps_fields() {
        let err = NormalizedError::synthesize(400, codes::INVALID_URL, "Invalid URL", None);
        assert_eq!(err.status(), 400);
        assert_eq!(err.code(), "INVALID_URL");
        assert_eq!(err.title(), "Invalid URL");
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn normalized_error_passes_through() {
        let original = normalize(&json!({
            "status": "404",
            "code": "NOT_FOUND",
            "title": "Missing",
            "meta": {"platform_specific": {"handling_guide": "Go back"}}
        }));
        let before = serde_json::to_string(&original).unwrap();

        let again = normalize_failure(Box::new(original.clone()));
        assert_eq!(again, original);
        assert_eq!(serde_json::to_string(&again).unwrap(), before);
    }

    #[test]
    fn foreign_failure_becomes_network_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = normalize_failure(Box::new(io));
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(err.status(), 500);
        assert_eq!(err.title(), "Network request failed");
        assert_eq!(err.detail(), Some("connection refused"));
    }

    #[test]
    fn serializes_with_marker_and_camel_case() {
        let err = normalize(&json!({
            "status": "409",
            "code": "CONFLICT",
            "title": "Already exists",
            "meta": {"platform_specific": {"recovery_suggestion": "Pick another name"}}
        }));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["isJadugarError"], true);
        assert_eq!(value["status"], 409);
        assert_eq!(value["recoverySuggestion"], "Pick another name");
        assert!(value.get("handlingGuide").is_none());
        assert!(value.get("id").is_none());
    }
}
