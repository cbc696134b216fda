//! Shared frame handling for the persistent bindings.
//!
//! TCP and WebSocket differ only in how frames arrive and leave the socket.
//! Everything between the two (size cap, envelope decode, spawned dispatch,
//! funneling responses into the connection's writer channel) lives here so
//! both bindings multiplex identically.
//!
//! The read loop never awaits a handler: each well-formed frame is dispatched
//! on its own task and the response is pushed into the per-connection mpsc
//! channel, so responses may leave in any order. A send onto a closed channel
//! means the peer is gone; the response is silently discarded.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::dispatch::Dispatcher;
use crate::envelope::{ResponseEnvelope, parse_envelope, recover_correlation_id};
use crate::error::GateError;

/// Handle one inbound frame: decode, dispatch, and queue the response.
///
/// Decode failures are answered inline (no task spawned); the correlation ID
/// is recovered from the malformed bytes when possible. Well-formed requests
/// run on their own task so this function returns immediately and the caller
/// can keep reading.
pub fn process_frame(
    dispatcher: &Arc<Dispatcher>,
    frame: &[u8],
    max_frame_bytes: usize,
    responses: &mpsc::Sender<ResponseEnvelope>,
) {
    if frame.len() > max_frame_bytes {
        let err = GateError::InvalidRequest {
            details: format!(
                "frame of {} bytes exceeds the {} byte limit",
                frame.len(),
                max_frame_bytes
            ),
        };
        // Oversized frames are not parsed at all, so the ID is unrecoverable.
        queue(responses, ResponseEnvelope::failure(None, &err));
        return;
    }

    let request = match parse_envelope(frame, true) {
        Ok(request) => request,
        Err(err) => {
            let id = recover_correlation_id(frame);
            debug!(kind = err.kind(), "frame rejected");
            queue(responses, ResponseEnvelope::failure(id, &err));
            return;
        }
    };

    let dispatcher = Arc::clone(dispatcher);
    let responses = responses.clone();
    tokio::spawn(async move {
        let response = dispatcher.dispatch(request).await;
        // A closed channel means the connection is gone; drop the response.
        let _ = responses.send(response).await;
    });
}

/// Serialize a response envelope for the wire.
///
/// Envelope serialization cannot fail for the types we put in them; if it
/// ever does, answer with a bare internal error rather than dropping the
/// frame on the floor.
pub fn encode_frame(response: &ResponseEnvelope) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!(error = %e, "response serialization failed");
        r#"{"error":{"kind":"internal","message":"internal error"}}"#.to_string()
    })
}

fn queue(responses: &mpsc::Sender<ResponseEnvelope>, response: ResponseEnvelope) {
    let responses = responses.clone();
    tokio::spawn(async move {
        let _ = responses.send(response).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::CorrelationId;
    use crate::registry::MethodRegistry;
    use serde_json::json;

    fn echo_dispatcher() -> Arc<Dispatcher> {
        let mut registry = MethodRegistry::new();
        registry
            .register("echo/ping", |args| {
                Box::pin(async move { Ok(args.unwrap_or_else(|| json!({}))) })
            })
            .unwrap();
        Arc::new(Dispatcher::new(Arc::new(registry), None))
    }

    #[tokio::test]
    async fn frame_round_trips_through_the_channel() {
        let d = echo_dispatcher();
        let (tx, mut rx) = mpsc::channel(8);

        process_frame(
            &d,
            br#"{"id":"abc123","method":"echo/ping","args":{"x":1}}"#,
            1024,
            &tx,
        );
        let resp = rx.recv().await.unwrap();
        assert_eq!(resp.id, Some(CorrelationId::String("abc123".to_string())));
        assert_eq!(resp.result.unwrap()["x"], 1);
    }

    #[tokio::test]
    async fn missing_id_is_rejected_without_dispatch() {
        let d = echo_dispatcher();
        let (tx, mut rx) = mpsc::channel(8);

        process_frame(&d, br#"{"method":"echo/ping"}"#, 1024, &tx);
        let resp = rx.recv().await.unwrap();
        assert_eq!(resp.error.unwrap().kind, "invalid_request");
    }

    #[tokio::test]
    async fn bad_json_still_recovers_nothing_but_answers() {
        let d = echo_dispatcher();
        let (tx, mut rx) = mpsc::channel(8);

        process_frame(&d, b"{not json", 1024, &tx);
        let resp = rx.recv().await.unwrap();
        assert!(resp.id.is_none());
        assert_eq!(resp.error.unwrap().kind, "parse_error");
    }

    #[tokio::test]
    async fn invalid_envelope_keeps_its_correlation_id() {
        let d = echo_dispatcher();
        let (tx, mut rx) = mpsc::channel(8);

        // Valid JSON, no method: the ID survives into the error response.
        process_frame(&d, br#"{"id":42,"args":{}}"#, 1024, &tx);
        let resp = rx.recv().await.unwrap();
        assert_eq!(resp.id, Some(CorrelationId::Number(42)));
        assert_eq!(resp.error.unwrap().kind, "invalid_request");
    }

    #[tokio::test]
    async fn oversized_frame_is_refused_before_parsing() {
        let d = echo_dispatcher();
        let (tx, mut rx) = mpsc::channel(8);

        let frame = format!(
            r#"{{"id":1,"method":"echo/ping","args":{{"pad":"{}"}}}}"#,
            "x".repeat(64)
        );
        process_frame(&d, frame.as_bytes(), 32, &tx);
        let resp = rx.recv().await.unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.kind, "invalid_request");
        assert!(err.message.contains("limit"));
    }

    #[test]
    fn encoded_frames_are_single_line_json() {
        let resp = ResponseEnvelope::success(Some(CorrelationId::Number(7)), json!({"ok": true}));
        let line = encode_frame(&resp);
        assert!(!line.contains('\n'));
        assert!(line.contains("\"id\":7"));
    }
}
