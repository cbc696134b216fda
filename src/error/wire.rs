//! Wire-level error structures.
//!
//! A [`WireError`] is the serialized error half of a response envelope. It is
//! transport-agnostic: the HTTP binding additionally maps the kind to a status
//! code, while the persistent bindings ship it verbatim inside the envelope.

use serde::{Deserialize, Serialize};

/// Structured error carried in a response envelope.
///
/// The `kind` field is a stable machine-readable string (see
/// [`GateError::kind`](crate::error::GateError::kind)); `message` is
/// human-readable. `details` carries sanitized, kind-specific context and is
/// omitted when there is nothing safe to add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    /// Machine-readable error kind (e.g. `"method_not_found"`)
    pub kind: String,

    /// Human-readable error message
    pub message: String,

    /// Sanitized, kind-specific details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_error_serialization() {
        let error = WireError {
            kind: "method_not_found".to_string(),
            message: "method 'echo/unknown' not found".to_string(),
            details: Some(serde_json::json!({ "method": "echo/unknown" })),
        };

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["kind"], "method_not_found");
        assert_eq!(json["message"], "method 'echo/unknown' not found");
        assert_eq!(json["details"]["method"], "echo/unknown");
    }

    #[test]
    fn details_omitted_when_absent() {
        let error = WireError {
            kind: "internal".to_string(),
            message: "internal error".to_string(),
            details: None,
        };

        let json = serde_json::to_string(&error).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn round_trips_through_json() {
        let error = WireError {
            kind: "conflict".to_string(),
            message: "tenant already exists".to_string(),
            details: None,
        };

        let parsed: WireError =
            serde_json::from_str(&serde_json::to_string(&error).unwrap()).unwrap();
        assert_eq!(parsed, error);
    }
}
