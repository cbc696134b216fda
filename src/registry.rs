//! Method registry: the process-wide table of named operations.
//!
//! A method name (`"<entity>/<action>"`) is the sole routing key across all
//! transports. Each name maps to exactly one handler, registered once at
//! startup and shared by the HTTP, TCP, and WebSocket bindings — the same
//! business logic is never registered per transport.
//!
//! The registry is mutable only during the registration phase. The
//! composition root wraps it in an `Arc` afterwards, so steady-state lookups
//! are plain `HashMap` reads with no locking.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::GateError;

/// Boxed future returned by a handler invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, GateError>> + Send>>;

/// A registered method handler: optional JSON arguments in, JSON value or
/// typed error out. Transport-agnostic by construction.
pub type Handler = Arc<dyn Fn(Option<Value>) -> HandlerFuture + Send + Sync>;

/// Descriptive metadata attached to a method for discovery.
///
/// The schema is advisory documentation for callers introspecting the method
/// set; it is never mechanically enforced before invocation. Requiredness is
/// checked by the handlers themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Human-readable description of the operation
    pub description: String,

    /// JSON Schema describing accepted arguments
    pub schema: Value,

    /// Names of required argument keys
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// Errors raised during the registration phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The method name is already registered.
    ///
    /// Silent overwrite would mask a wiring bug at startup, so duplicates are
    /// a hard error.
    #[error("method '{method}' is already registered")]
    Duplicate {
        /// The conflicting method name
        method: String,
    },

    /// The method name does not follow the `"<entity>/<action>"` form.
    #[error("invalid method name '{method}': expected \"<entity>/<action>\"")]
    InvalidName {
        /// The rejected method name
        method: String,
    },
}

struct Registration {
    handler: Handler,
    metadata: Option<ToolMetadata>,
}

/// Table mapping method names to handlers and optional tool metadata.
#[derive(Default)]
pub struct MethodRegistry {
    table: HashMap<String, Registration>,
    /// Insertion order, for deterministic discovery listings.
    order: Vec<String>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler without discovery metadata.
    pub fn register<F>(&mut self, name: &str, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(Option<Value>) -> HandlerFuture + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(handler), None)
    }

    /// Register a handler together with its tool metadata.
    pub fn register_tool<F>(
        &mut self,
        name: &str,
        metadata: ToolMetadata,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Option<Value>) -> HandlerFuture + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(handler), Some(metadata))
    }

    fn insert(
        &mut self,
        name: &str,
        handler: Handler,
        metadata: Option<ToolMetadata>,
    ) -> Result<(), RegistryError> {
        let mut parts = name.splitn(2, '/');
        let entity = parts.next().unwrap_or_default();
        let action = parts.next().unwrap_or_default();
        if entity.is_empty() || action.is_empty() {
            return Err(RegistryError::InvalidName {
                method: name.to_string(),
            });
        }

        if self.table.contains_key(name) {
            return Err(RegistryError::Duplicate {
                method: name.to_string(),
            });
        }

        self.order.push(name.to_string());
        self.table
            .insert(name.to_string(), Registration { handler, metadata });
        Ok(())
    }

    /// Look up the handler for a method name. O(1); safe for concurrent
    /// callers once registration is complete.
    pub fn resolve(&self, name: &str) -> Option<Handler> {
        self.table.get(name).map(|r| Arc::clone(&r.handler))
    }

    /// Iterate `(name, metadata)` pairs in registration order.
    pub fn list_tools(&self) -> impl Iterator<Item = (&str, Option<&ToolMetadata>)> {
        self.order.iter().map(|name| {
            let reg = &self.table[name];
            (name.as_str(), reg.metadata.as_ref())
        })
    }

    /// Method names in registration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry has no methods.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
