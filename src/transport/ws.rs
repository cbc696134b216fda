//! Persistent WebSocket binding: one request envelope per text or binary
//! frame, responses as text frames.
//!
//! Shares the multiplexing core with the TCP binding; only the frame codec
//! differs. Pings are answered with pongs carrying the same payload; a close
//! frame (or any protocol error) moves the connection to closing, after
//! which no new dispatches are accepted.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use super::framed;
use crate::dispatch::Dispatcher;
use crate::envelope::ResponseEnvelope;

const RESPONSE_QUEUE_DEPTH: usize = 64;

/// Accept WebSocket connections until the shutdown signal fires.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    max_frame_bytes: usize,
    shutdown: broadcast::Sender<()>,
) -> std::io::Result<()> {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            _ = stop.recv() => {
                info!("ws: listener shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                let dispatcher = Arc::clone(&dispatcher);
                let stop = shutdown.subscribe();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, peer, dispatcher, max_frame_bytes, stop).await {
                        debug!(%peer, error = %e, "ws: connection failed");
                    }
                });
            }
        }
    }
}

async fn handle_connection(
    socket: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    max_frame_bytes: usize,
    mut stop: broadcast::Receiver<()>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let stream = tokio_tungstenite::accept_async(socket).await?;
    debug!(%peer, "ws: connection established");
    let (mut sink, mut source) = stream.split();

    // All outbound frames (responses and pongs) funnel through one channel
    // so the sink has a single owner.
    let (msg_tx, mut msg_rx) = mpsc::channel::<Message>(RESPONSE_QUEUE_DEPTH);
    let writer = tokio::spawn(async move {
        while let Some(message) = msg_rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let (env_tx, mut env_rx) = mpsc::channel::<ResponseEnvelope>(RESPONSE_QUEUE_DEPTH);
    {
        let msg_tx = msg_tx.clone();
        tokio::spawn(async move {
            while let Some(response) = env_rx.recv().await {
                let frame = Message::Text(framed::encode_frame(&response));
                if msg_tx.send(frame).await.is_err() {
                    break;
                }
            }
        });
    }

    loop {
        tokio::select! {
            _ = stop.recv() => break,
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    framed::process_frame(&dispatcher, text.as_bytes(), max_frame_bytes, &env_tx);
                }
                Some(Ok(Message::Binary(bytes))) => {
                    framed::process_frame(&dispatcher, &bytes, max_frame_bytes, &env_tx);
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = msg_tx.send(Message::Pong(payload)).await;
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => {
                    debug!(%peer, error = %e, "ws: read failed");
                    break;
                }
            }
        }
    }

    drop(env_tx);
    drop(msg_tx);
    let _ = writer.await;
    debug!(%peer, "ws: connection closed");
    Ok(())
}
