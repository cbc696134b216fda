//! The dispatcher: one code path from request envelope to response envelope.
//!
//! Every transport binding hands decoded envelopes to [`Dispatcher::dispatch`]
//! and encodes whatever comes back. The dispatcher guarantees:
//!
//! - an unknown method produces `MethodNotFound` without invoking anything;
//! - each handler runs on its own tokio task, so a panic or a slow downstream
//!   call never stalls a transport's read loop or harms sibling calls;
//! - the response always carries the request's correlation ID unchanged;
//! - every call resolves to exactly one of success payload or typed error.
//!
//! # Timeout semantics
//!
//! A timed-out call returns [`GateError::Timeout`] to its caller and the
//! handler task is abandoned, not aborted. The handler may still complete and
//! its side effects may still land — at-least-once on timeout, by contract.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::GateError;
use crate::registry::MethodRegistry;

/// Shared dispatch logic for all transport bindings.
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
    default_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher over a finished registry.
    ///
    /// `default_timeout` applies to every call that does not supply its own;
    /// `None` means calls may wait on their handler indefinitely.
    pub fn new(registry: Arc<MethodRegistry>, default_timeout: Option<Duration>) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    /// The registry this dispatcher resolves against.
    pub fn registry(&self) -> &Arc<MethodRegistry> {
        &self.registry
    }

    /// Dispatch one request with the default timeout.
    pub async fn dispatch(&self, request: RequestEnvelope) -> ResponseEnvelope {
        self.dispatch_with_timeout(request, self.default_timeout)
            .await
    }

    /// Dispatch one request with a caller-supplied timeout.
    pub async fn dispatch_with_timeout(
        &self,
        request: RequestEnvelope,
        timeout: Option<Duration>,
    ) -> ResponseEnvelope {
        let RequestEnvelope { id, method, args } = request;

        let Some(handler) = self.registry.resolve(&method) else {
            debug!(method = %method, "dispatch: method not found");
            return ResponseEnvelope::failure(id, &GateError::MethodNotFound { method });
        };

        // The handler gets its own task: panics are contained in the
        // JoinError and a slow handler cannot block the caller's loop.
        let task = tokio::spawn(handler(args));

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_elapsed) => {
                    warn!(method = %method, timeout_ms = limit.as_millis() as u64,
                        "dispatch: call timed out; handler task abandoned");
                    return ResponseEnvelope::failure(
                        id,
                        &GateError::Timeout {
                            method,
                            timeout_ms: limit.as_millis() as u64,
                        },
                    );
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(result)) => {
                debug!(method = %method, "dispatch: ok");
                ResponseEnvelope::success(id, result)
            }
            Ok(Err(err)) => {
                debug!(method = %method, kind = err.kind(), "dispatch: handler error");
                ResponseEnvelope::failure(id, &err)
            }
            Err(join_err) => {
                let err = if join_err.is_cancelled() {
                    GateError::Cancelled
                } else {
                    // A panic. The payload goes to the logs, never the wire.
                    warn!(method = %method, panic = %join_err, "dispatch: handler panicked");
                    GateError::Internal {
                        details: join_err.to_string(),
                    }
                };
                ResponseEnvelope::failure(id, &err)
            }
        }
    }
}
