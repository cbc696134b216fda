//! Error handling for GraphGate.
//!
//! This module defines the single error taxonomy shared by the dispatcher and
//! all transport bindings, plus the wire-level error shape embedded in
//! response envelopes.
//!
//! ## Module Organization
//!
//! - `wire` - serialized error structures for response envelopes
//! - `GateError` - the error taxonomy every call site resolves into
//!
//! Every dispatched call produces exactly one of (success payload) or
//! (typed error) — an error never escapes as a panic into a transport loop.

pub mod wire;

pub use wire::WireError;

use thiserror::Error;

/// All error kinds a dispatched call can resolve to.
///
/// Transport decode failures (`ParseError`, `InvalidRequest`) and dispatch
/// failures (everything else) share one taxonomy so transports can translate
/// errors into their native signaling without inventing per-transport
/// semantics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateError {
    /// Request bytes are not valid JSON.
    #[error("invalid JSON: {details}")]
    ParseError {
        /// Description of the parse error
        details: String,
    },

    /// Request parsed as JSON but is not a valid envelope.
    #[error("invalid request: {details}")]
    InvalidRequest {
        /// What makes the envelope invalid
        details: String,
    },

    /// The requested method has no registered handler.
    #[error("method '{method}' not found")]
    MethodNotFound {
        /// The method name that was not found
        method: String,
    },

    /// Required arguments are missing, malformed, or fail type coercion.
    #[error("invalid arguments: {details}")]
    InvalidArguments {
        /// Description of the argument failure
        details: String,
    },

    /// The downstream entity referenced by the call does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// The entity type (tenant, graph, node, ...)
        entity: String,
        /// The identifier that was not found
        id: String,
    },

    /// The downstream operation was rejected due to a state conflict.
    #[error("conflict: {details}")]
    Conflict {
        /// Description of the conflict
        details: String,
    },

    /// The call exceeded its allotted time.
    ///
    /// The handler task is abandoned, not aborted: its side effects may still
    /// land after this error is returned.
    #[error("method '{method}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The method that timed out
        method: String,
        /// The timeout that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// The call was cancelled by its caller before completion.
    #[error("call was cancelled")]
    Cancelled,

    /// The service cannot accept the call right now (saturation, shutdown,
    /// downstream engine unreachable).
    #[error("service unavailable: {reason}")]
    Unavailable {
        /// Reason for unavailability
        reason: String,
    },

    /// Any other unexpected failure, including handler panics.
    ///
    /// The description is for the logs; the wire message never includes it.
    #[error("internal error")]
    Internal {
        /// Description for the logs
        details: String,
    },
}

impl GateError {
    /// Returns the stable machine-readable kind string.
    ///
    /// Used in wire errors, log fields, and tests. Names never change once
    /// shipped; clients match on them.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => "parse_error",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::MethodNotFound { .. } => "method_not_found",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Unavailable { .. } => "unavailable",
            Self::Internal { .. } => "internal",
        }
    }

    /// Returns safe, kind-specific details for client consumption.
    ///
    /// Internal error details stay in the logs; the wire carries only what a
    /// caller can act on.
    pub fn safe_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::MethodNotFound { method } => Some(serde_json::json!({ "method": method })),
            Self::NotFound { entity, id } => {
                Some(serde_json::json!({ "entity": entity, "id": id }))
            }
            Self::Timeout { method, timeout_ms } => {
                Some(serde_json::json!({ "method": method, "timeout_ms": timeout_ms }))
            }
            _ => None,
        }
    }

    /// Converts this error into the wire shape embedded in a response envelope.
    pub fn to_wire(&self) -> WireError {
        WireError {
            kind: self.kind().to_string(),
            message: self.to_string(),
            details: self.safe_details(),
        }
    }
}
