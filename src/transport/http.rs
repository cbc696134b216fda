//! HTTP binding: request/response RPC plus method discovery.
//!
//! `POST /rpc/v1` carries one request envelope (no correlation ID; HTTP's own
//! pairing correlates). `GET /rpc/v1/methods` lists the registered method
//! surface in registration order. A body-size cap rejects oversized requests
//! before they buffer, and a semaphore sheds load with 503 when the
//! configured concurrency is exhausted.

use std::sync::Arc;

use axum::Json;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, broadcast};
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::envelope::{ResponseEnvelope, parse_envelope};
use crate::error::GateError;

/// Shared state behind the HTTP routes.
#[derive(Clone)]
struct HttpState {
    dispatcher: Arc<Dispatcher>,
    permits: Arc<Semaphore>,
}

/// Build the router for the RPC endpoints.
pub fn router(
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
    max_concurrency: usize,
) -> axum::Router {
    let state = HttpState {
        dispatcher,
        permits: Arc::new(Semaphore::new(max_concurrency)),
    };
    axum::Router::new()
        .route("/rpc/v1", post(rpc))
        .route("/rpc/v1/methods", get(methods))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Serve the router until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    router: axum::Router,
    shutdown: broadcast::Sender<()>,
) -> std::io::Result<()> {
    let mut stop = shutdown.subscribe();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stop.recv().await;
            info!("http: listener shutting down");
        })
        .await
}

/// Map an error kind to its HTTP status.
///
/// Clients get the machine-readable kind in the body either way; the status
/// exists so plain HTTP tooling can triage without parsing.
fn status_for(kind: &str) -> StatusCode {
    match kind {
        "parse_error" | "invalid_request" | "invalid_arguments" => StatusCode::BAD_REQUEST,
        "method_not_found" | "not_found" => StatusCode::NOT_FOUND,
        "conflict" => StatusCode::CONFLICT,
        "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
        "timeout" => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &GateError) -> Response {
    let envelope = ResponseEnvelope::failure(None, err);
    (status_for(err.kind()), Json(envelope)).into_response()
}

async fn rpc(State(state): State<HttpState>, body: Bytes) -> Response {
    let Ok(_permit) = Arc::clone(&state.permits).try_acquire_owned() else {
        debug!("http: concurrency limit reached, shedding request");
        return error_response(&GateError::Unavailable {
            reason: "server is at capacity".to_string(),
        });
    };

    let request = match parse_envelope(&body, false) {
        Ok(request) => request,
        Err(err) => return error_response(&err),
    };

    let response = state.dispatcher.dispatch(request).await;
    let status = response
        .error
        .as_ref()
        .map_or(StatusCode::OK, |e| status_for(&e.kind));
    (status, Json(response)).into_response()
}

async fn methods(State(state): State<HttpState>) -> Response {
    let methods: Vec<_> = state
        .dispatcher
        .registry()
        .list_tools()
        .map(|(name, metadata)| match metadata {
            Some(meta) => json!({
                "name": name,
                "description": meta.description,
                "schema": meta.schema,
                "required": meta.required,
            }),
            None => json!({ "name": name }),
        })
        .collect();
    Json(json!({ "methods": methods })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_kind_has_a_status() {
        assert_eq!(status_for("parse_error"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("invalid_request"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("invalid_arguments"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("method_not_found"), StatusCode::NOT_FOUND);
        assert_eq!(status_for("not_found"), StatusCode::NOT_FOUND);
        assert_eq!(status_for("conflict"), StatusCode::CONFLICT);
        assert_eq!(status_for("unavailable"), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for("timeout"), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_for("internal"), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for("cancelled"), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
