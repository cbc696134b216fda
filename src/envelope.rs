//! Request and response envelopes — the wire-level unit of work.
//!
//! An envelope is what every transport decodes a call into and encodes a
//! result out of: a method name, an optional JSON arguments object, and (on
//! persistent transports) a caller-chosen correlation ID that the response
//! must echo back unchanged.
//!
//! # Security Note
//!
//! This module parses untrusted input. Size limits are enforced by the
//! transports before bytes reach [`parse_envelope`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{GateError, WireError};

/// Caller-assigned correlation identifier for persistent transports.
///
/// Callers may use string or integer IDs. The exact type is preserved in the
/// response: if the caller sends `"id": 7`, the response carries `"id": 7`,
/// never `"id": "7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CorrelationId {
    /// Integer ID (e.g. `"id": 7`)
    Number(i64),
    /// String ID (e.g. `"id": "abc123"`)
    String(String),
}

impl Serialize for CorrelationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CorrelationId::Number(n) => serializer.serialize_i64(*n),
            CorrelationId::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for CorrelationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Number(n) => n.as_i64().map(CorrelationId::Number).ok_or_else(|| {
                serde::de::Error::custom("correlation id must be an integer, not a float")
            }),
            Value::String(s) => Ok(CorrelationId::String(s)),
            _ => Err(serde::de::Error::custom(
                "correlation id must be a string or integer",
            )),
        }
    }
}

/// Raw envelope as received off the wire.
///
/// All fields are optional so malformed requests can be reported precisely
/// instead of failing deserialization wholesale.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    id: Option<CorrelationId>,
    method: Option<String>,
    args: Option<Value>,
}

/// Validated request envelope.
///
/// `id` is `Some` on persistent transports (TCP, WebSocket) and `None` on the
/// HTTP binding, where the transport's own request/response pairing provides
/// correlation.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Correlation ID; required on persistent transports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationId>,
    /// Method name, `"<entity>/<action>"`
    pub method: String,
    /// Structured JSON arguments (never a JSON-encoded string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
}

impl RequestEnvelope {
    /// Build an envelope directly, bypassing wire parsing.
    ///
    /// The HTTP binding and tests use this once they have a method name and
    /// arguments in hand.
    pub fn new(id: Option<CorrelationId>, method: impl Into<String>, args: Option<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            args,
        }
    }
}

/// Response envelope: the correlation ID of the originating request plus
/// exactly one of a success payload or a structured error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Correlation ID echoed from the request (absent on HTTP)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationId>,
    /// Success payload (mutually exclusive with `error`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Structured error (mutually exclusive with `result`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl ResponseEnvelope {
    /// Create a success response echoing the request's correlation ID.
    pub fn success(id: Option<CorrelationId>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response echoing the request's correlation ID.
    ///
    /// Pass `None` for `id` when the ID could not be recovered from a
    /// malformed request.
    pub fn failure(id: Option<CorrelationId>, error: &GateError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.to_wire()),
        }
    }
}

/// Parse raw bytes into a request envelope.
///
/// Distinguishes malformed JSON (`ParseError`) from structurally invalid
/// envelopes (`InvalidRequest`) so callers get the right error kind.
///
/// # Arguments
///
/// * `bytes` - one complete JSON document (one NDJSON line, one WebSocket
///   frame, or one HTTP body)
/// * `require_id` - `true` on persistent transports, where a request without
///   a correlation ID cannot be answered usefully
pub fn parse_envelope(bytes: &[u8], require_id: bool) -> Result<RequestEnvelope, GateError> {
    let raw: RawEnvelope = serde_json::from_slice(bytes).map_err(|e| {
        // Syntax errors are bad JSON; anything else is valid JSON with
        // invalid field values (e.g. a float id).
        if e.is_syntax() || e.is_eof() {
            GateError::ParseError {
                details: e.to_string(),
            }
        } else {
            GateError::InvalidRequest {
                details: e.to_string(),
            }
        }
    })?;

    let method = raw.method.ok_or_else(|| GateError::InvalidRequest {
        details: "missing required field: method".to_string(),
    })?;

    if require_id && raw.id.is_none() {
        return Err(GateError::InvalidRequest {
            details: "missing required field: id".to_string(),
        });
    }

    if let Some(args) = &raw.args {
        if !args.is_object() && !args.is_null() {
            return Err(GateError::InvalidRequest {
                details: "args must be a JSON object".to_string(),
            });
        }
    }

    Ok(RequestEnvelope {
        id: raw.id,
        method,
        args: raw.args.filter(|v| !v.is_null()),
    })
}

/// Best-effort correlation ID extraction from bytes that failed to parse as
/// an envelope, so the error response can still be matched to its request.
pub fn recover_correlation_id(bytes: &[u8]) -> Option<CorrelationId> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    match value.get("id")? {
        Value::Number(n) => n.as_i64().map(CorrelationId::Number),
        Value::String(s) => Some(CorrelationId::String(s.clone())),
        _ => None,
    }
}
