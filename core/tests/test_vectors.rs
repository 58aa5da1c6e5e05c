//! Replay `test-vectors/responses.json` through `parse_response`.
//!
//! Each case is either a simulated response or a transport error, plus the
//! decoded value or the normalized error fields it must produce. Only the
//! error fields a case lists are compared; absent guidance fields must be
//! absent on the result.

use jadugar_core::{parse_response, Headers, HttpResponse, NormalizedError, TransportFailure};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, PartialEq)]
struct Counter {
    value: i64,
}

fn outcome(case: &Value) -> Result<HttpResponse, TransportFailure> {
    if let Some(detail) = case.get("transport_error") {
        return Err(TransportFailure::Network(detail.as_str().unwrap().to_string()));
    }
    let sim = &case["response"];
    Ok(HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Headers::new(),
        body: sim["body"].as_str().map(str::to_string),
    })
}

fn check_error(name: &str, err: &NormalizedError, expected: &Value) {
    assert!(err.is_jadugar_error(), "{name}: marker");
    assert_eq!(u64::from(err.status()), expected["status"].as_u64().unwrap(), "{name}: status");
    assert_eq!(err.code(), expected["code"].as_str().unwrap(), "{name}: code");
    assert_eq!(err.title(), expected["title"].as_str().unwrap(), "{name}: title");
    assert_eq!(err.id(), expected["id"].as_str(), "{name}: id");
    assert_eq!(err.handling_guide(), expected["handling_guide"].as_str(), "{name}: handling_guide");
    assert_eq!(
        err.recovery_suggestion(),
        expected["recovery_suggestion"].as_str(),
        "{name}: recovery_suggestion"
    );
    if let Some(detail) = expected.get("detail") {
        assert_eq!(err.detail(), detail.as_str(), "{name}: detail");
    }
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = parse_response::<Counter>(outcome(case));

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.expect_err(name);
            check_error(name, &err, expected_error);
        } else {
            let counter = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e:?}"));
            let expected: Counter = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(counter, expected, "{name}: parsed result");
        }
    }
}
