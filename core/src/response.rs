//! Classification of a finished exchange into a typed value or one
//! `NormalizedError`.
//!
//! The checks run in a fixed order and every branch returns:
//! transport failure, unusable response, missing body, non-2xx status
//! (error envelope), then decoding of the success body. The status code is
//! always classified before the body is decoded.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{codes, normalize, NormalizedError, DEFAULT_STATUS};
use crate::http::{HttpResponse, TransportFailure};

pub fn parse_response<R: DeserializeOwned>(
    outcome: Result<HttpResponse, TransportFailure>,
) -> Result<R, NormalizedError> {
    let response = match outcome {
        Ok(response) => response,
        Err(TransportFailure::Network(detail)) => {
            return Err(NormalizedError::synthesize(
                DEFAULT_STATUS,
                codes::NETWORK_ERROR,
                "Network request failed",
                Some(detail),
            ))
        }
        Err(TransportFailure::InvalidResponse) => return Err(invalid_response()),
    };

    if !(100..=599).contains(&response.status) {
        return Err(invalid_response());
    }

    let Some(body) = response.body else {
        return Err(NormalizedError::synthesize(
            DEFAULT_STATUS,
            codes::NO_DATA,
            "No data received",
            None,
        ));
    };

    if !(200..=299).contains(&response.status) {
        return Err(error_from_body(response.status, &body));
    }

    decode_body(&body)
}

fn invalid_response() -> NormalizedError {
    NormalizedError::synthesize(
        DEFAULT_STATUS,
        codes::INVALID_RESPONSE,
        "Invalid response received",
        None,
    )
}

/// Interpret the body of a non-2xx response.
fn error_from_body(status: u16, body: &str) -> NormalizedError {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) => {
            return NormalizedError::synthesize(
                status,
                codes::PARSE_ERROR,
                "Failed to parse error response",
                None,
            )
        }
    };

    match first_error_object(&json) {
        Some(object) => normalize(object),
        None => NormalizedError::synthesize(status, codes::HTTP_ERROR, "HTTP error occurred", None),
    }
}

/// `errors` must be a non-empty array made only of objects.
fn first_error_object(json: &Value) -> Option<&Value> {
    let errors = json.get("errors")?.as_array()?;
    if !errors.iter().all(Value::is_object) {
        return None;
    }
    errors.first()
}

/// An empty body is not JSON, so it fails like any other undecodable body.
fn decode_body<R: DeserializeOwned>(body: &str) -> Result<R, NormalizedError> {
    serde_json::from_str(body).map_err(|e| {
        NormalizedError::synthesize(
            DEFAULT_STATUS,
            codes::DECODE_ERROR,
            "Failed to decode response",
            Some(e.to_string()),
        )
    })
}
