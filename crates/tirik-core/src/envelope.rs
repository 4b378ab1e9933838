//! # Response Envelope
//!
//! Every upstream response is wrapped as `{success, data, error}`.
//! Successful envelopes are handed back verbatim; failed ones are turned
//! into a [`PaymentError`] by [`classify_error`].
//!
//! ## Classification
//!
//! ```text
//! code == ERROR_INTERNAL ──► parse description ──► error.code == ERROR_CARD_NOT_FOUND ──► CardNotFound
//!        │                        │                          │
//!        │                  not JSON / no `error`            └─ otherwise ─┐
//!        │                        ▼                                        │
//!        │                 MalformedResponse                               │
//! code == ERROR_NOT_FOUND ───────────────────────────► PaymentNotFound     │
//! anything else ◄──────────────────────────────────────────────────────────┘
//!        └───────────────────────────────────────────► Failed
//! ```

use crate::error::{PaymentError, PaymentResult, UpstreamError, UNKNOWN_ERROR_MESSAGE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CODE_INTERNAL: &str = "ERROR_INTERNAL";
pub const CODE_NOT_FOUND: &str = "ERROR_NOT_FOUND";
pub const CODE_CARD_NOT_FOUND: &str = "ERROR_CARD_NOT_FOUND";

/// A successful upstream envelope, kept exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Value);

impl Envelope {
    /// Wrap a raw value without checking it
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn is_success(&self) -> bool {
        self.0.get("success").map(is_truthy).unwrap_or(false)
    }

    /// The `data` member, `None` when absent or `null`
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data").filter(|v| !v.is_null())
    }

    /// Decode `data` into a typed view.
    pub fn data_as<T: DeserializeOwned>(&self) -> PaymentResult<T> {
        let data = self
            .data()
            .ok_or_else(|| PaymentError::MalformedResponse("Envelope has no data".to_string()))?;
        T::deserialize(data).map_err(|e| {
            PaymentError::MalformedResponse(format!("Failed to decode envelope data: {}", e))
        })
    }
}

/// Truthiness as the upstream API uses it: `null`, `false`, `0`, `""`,
/// `[]` and `{}` are all falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Accept a decoded body as an [`Envelope`] or classify its `error` member.
///
/// A missing or `null` error object is treated as `{}`.
pub fn check_envelope(body: Value) -> PaymentResult<Envelope> {
    let success = body.get("success").map(is_truthy).unwrap_or(false);
    if success {
        return Ok(Envelope(body));
    }

    let empty = Value::Object(Default::default());
    let error = body
        .get("error")
        .filter(|v| !v.is_null())
        .unwrap_or(&empty);
    Err(classify_error(error))
}

/// Turn an upstream error object into the matching [`PaymentError`].
///
/// Never produces a success value.
pub fn classify_error(error: &Value) -> PaymentError {
    let code = error.get("code").and_then(Value::as_str).map(String::from);
    let message = error
        .get("message")
        .and_then(|m| m.get("en"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
        .to_string();
    let description = error
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    match code.as_deref() {
        Some(CODE_INTERNAL) => match nested_card_error(&description) {
            Ok(Some(details)) => PaymentError::CardNotFound {
                details,
                code: CODE_INTERNAL.to_string(),
                description,
            },
            Ok(None) => PaymentError::Failed(UpstreamError::new(message, code, Some(description))),
            Err(fault) => fault,
        },
        Some(CODE_NOT_FOUND) => {
            PaymentError::PaymentNotFound(UpstreamError::new(message, code, Some(description)))
        }
        _ => PaymentError::Failed(UpstreamError::new(message, code, Some(description))),
    }
}

#[derive(Debug, Deserialize)]
struct NestedDescription {
    error: NestedError,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    details: Option<Value>,
}

/// Second-stage parse of an `ERROR_INTERNAL` description.
///
/// `Ok(Some(details))` for a card-not-found payload, `Ok(None)` for any other
/// nested code, `Err` when the description is not the expected JSON shape.
fn nested_card_error(description: &str) -> Result<Option<Value>, PaymentError> {
    let nested: NestedDescription = serde_json::from_str(description).map_err(|e| {
        PaymentError::MalformedResponse(format!(
            "Unparseable {} description: {}",
            CODE_INTERNAL, e
        ))
    })?;

    let is_card = matches!(
        nested.error.code,
        Some(Value::String(ref c)) if c == CODE_CARD_NOT_FOUND
    );
    if !is_card {
        return Ok(None);
    }

    let details = match nested.error.details {
        Some(Value::Null) | None => Value::String(String::new()),
        Some(d) => d,
    };
    Ok(Some(details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(error: Value) -> Value {
        json!({ "success": false, "data": null, "error": error })
    }

    #[test]
    fn test_success_envelope_is_returned_unchanged() {
        let body = json!({
            "success": true,
            "data": { "payId": "ecdd416a", "nested": [1, 2, { "x": null }] },
            "error": null,
            "extra": "kept"
        });
        let envelope = check_envelope(body.clone()).unwrap();
        assert_eq!(envelope.as_value(), &body);
        assert!(envelope.is_success());
        assert_eq!(envelope.into_value(), body);
    }

    #[test]
    fn test_not_found_maps_to_payment_not_found() {
        let err = check_envelope(failure(json!({
            "code": "ERROR_NOT_FOUND",
            "message": { "en": "Payment not found", "ru": "..." },
            "description": "no such pay id"
        })))
        .unwrap_err();

        match err {
            PaymentError::PaymentNotFound(e) => {
                assert_eq!(e.message, "Payment not found");
                assert_eq!(e.code.as_deref(), Some("ERROR_NOT_FOUND"));
                assert_eq!(e.description.as_deref(), Some("no such pay id"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_card_not_found_extracts_details() {
        let description = r#"{"error":{"code":"ERROR_CARD_NOT_FOUND","details":"X"}}"#;
        let err = check_envelope(failure(json!({
            "code": "ERROR_INTERNAL",
            "message": { "en": "Internal error" },
            "description": description
        })))
        .unwrap_err();

        match err {
            PaymentError::CardNotFound {
                details,
                code,
                description: d,
            } => {
                assert_eq!(details, json!("X"));
                assert_eq!(code, "ERROR_INTERNAL");
                assert_eq!(d, description);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_card_not_found_without_details_defaults_to_empty() {
        let err = classify_error(&json!({
            "code": "ERROR_INTERNAL",
            "description": r#"{"error":{"code":"ERROR_CARD_NOT_FOUND"}}"#
        }));
        assert!(matches!(
            err,
            PaymentError::CardNotFound { ref details, .. } if details == &json!("")
        ));
    }

    #[test]
    fn test_internal_with_other_nested_code_is_generic() {
        let err = classify_error(&json!({
            "code": "ERROR_INTERNAL",
            "message": { "en": "Gateway down" },
            "description": r#"{"error":{"code":"ERROR_TIMEOUT","details":"slow"}}"#
        }));
        match err {
            PaymentError::Failed(e) => {
                assert_eq!(e.code.as_deref(), Some("ERROR_INTERNAL"));
                assert_eq!(e.message, "Gateway down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_internal_with_unparseable_description_is_malformed() {
        let err = classify_error(&json!({
            "code": "ERROR_INTERNAL",
            "description": "upstream exploded"
        }));
        assert!(matches!(err, PaymentError::MalformedResponse(_)));

        let err = classify_error(&json!({ "code": "ERROR_INTERNAL" }));
        assert!(matches!(err, PaymentError::MalformedResponse(_)));

        let err = classify_error(&json!({
            "code": "ERROR_INTERNAL",
            "description": r#"{"status":"bad"}"#
        }));
        assert!(matches!(err, PaymentError::MalformedResponse(_)));
    }

    #[test]
    fn test_other_codes_are_generic() {
        let err = check_envelope(failure(json!({
            "code": "ERROR_VALIDATION",
            "message": { "en": "Amount is too small" },
            "description": ""
        })))
        .unwrap_err();

        assert_eq!(err.code(), Some("ERROR_VALIDATION"));
        assert_eq!(err.message(), "Amount is too small");
        assert!(matches!(err, PaymentError::Failed(_)));
    }

    #[test]
    fn test_missing_error_object_is_unknown_generic() {
        for body in [
            json!({ "success": false }),
            json!({ "success": false, "error": null }),
            json!({}),
        ] {
            let err = check_envelope(body).unwrap_err();
            match err {
                PaymentError::Failed(e) => {
                    assert_eq!(e.message, UNKNOWN_ERROR_MESSAGE);
                    assert!(e.code.is_none());
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_malformed_message_falls_back() {
        let err = classify_error(&json!({ "code": "ERROR_X", "message": "plain string" }));
        assert_eq!(err.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({ "donateId": 7 })));
    }

    #[test]
    fn test_data_as_typed_view() {
        #[derive(Deserialize)]
        struct Status(String);

        let envelope = check_envelope(json!({ "success": true, "data": "Paid" })).unwrap();
        let status: Status = envelope.data_as().unwrap();
        assert_eq!(status.0, "Paid");

        let empty = Envelope::from_value(json!({ "success": true, "data": null }));
        assert!(empty.data().is_none());
        assert!(matches!(
            empty.data_as::<Status>(),
            Err(PaymentError::MalformedResponse(_))
        ));
    }
}
