//! Persistent TCP binding: one JSON request envelope per newline-terminated
//! line, responses written as they complete.
//!
//! Each connection runs a read loop and a single writer task joined by an
//! mpsc channel. The read loop only decodes and hands off; it never waits on
//! a handler, so a slow call cannot stall the socket. Once the read loop
//! exits (peer close, read error, or shutdown) no new dispatches are
//! accepted; in-flight dispatches finish and their responses are discarded
//! when the writer is gone.
//!
//! Lines are read through [`read_bounded_line`], which enforces the frame
//! cap while reading: a peer streaming bytes with no newline can never make
//! the server buffer more than `max_frame_bytes` for a single line.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use super::framed;
use crate::dispatch::Dispatcher;
use crate::envelope::ResponseEnvelope;
use crate::error::GateError;

/// Responses queued per connection before dispatch tasks start backpressuring.
const RESPONSE_QUEUE_DEPTH: usize = 64;

/// Accept connections until the shutdown signal fires.
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
                info!("tcp: listener shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (socket, peer) = accepted?;
                debug!(%peer, "tcp: connection accepted");
                let dispatcher = Arc::clone(&dispatcher);
                let stop = shutdown.subscribe();
                tokio::spawn(async move {
                    handle_connection(socket, peer, dispatcher, max_frame_bytes, stop).await;
                    debug!(%peer, "tcp: connection closed");
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
) {
    let (read_half, write_half) = socket.into_split();
    let (tx, mut rx) = mpsc::channel::<ResponseEnvelope>(RESPONSE_QUEUE_DEPTH);

    let writer = tokio::spawn(async move {
        let mut out = BufWriter::new(write_half);
        while let Some(response) = rx.recv().await {
            let line = framed::encode_frame(&response);
            if out.write_all(line.as_bytes()).await.is_err()
                || out.write_all(b"\n").await.is_err()
                || out.flush().await.is_err()
            {
                // Peer is gone; remaining responses are discarded as the
                // channel drains into a closed receiver.
                break;
            }
        }
    });

    let mut reader = BufReader::new(read_half);
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            read = read_bounded_line(&mut reader, max_frame_bytes) => match read {
                Ok(Line::Frame(frame)) => {
                    framed::process_frame(&dispatcher, &frame, max_frame_bytes, &tx);
                }
                Ok(Line::Oversized(len)) => {
                    debug!(%peer, bytes = len, "tcp: oversized line discarded");
                    let err = GateError::InvalidRequest {
                        details: format!(
                            "frame of {len} bytes exceeds the {max_frame_bytes} byte limit"
                        ),
                    };
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let _ = tx.send(ResponseEnvelope::failure(None, &err)).await;
                    });
                }
                Ok(Line::Eof) => break,
                Err(e) => {
                    debug!(%peer, error = %e, "tcp: read failed");
                    break;
                }
            }
        }
    }

    // Closing: dropping our sender lets the writer drain whatever in-flight
    // dispatches still produce, then exit when the last clone goes away.
    drop(tx);
    let _ = writer.await;
}

/// Outcome of one bounded line read.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    /// A complete line of at most the cap, newline stripped.
    Frame(Vec<u8>),
    /// A line longer than the cap; its bytes were drained, not buffered.
    /// Carries the line's length for the error message.
    Oversized(usize),
    /// The peer closed the connection.
    Eof,
}

/// Read one newline-terminated line, buffering at most `max` bytes.
///
/// Unlike a bare `read_line`, a line that exceeds the cap is discarded as it
/// streams in: the remainder up to the newline is consumed from the socket
/// without being kept, so the peak allocation per connection stays bounded by
/// the cap no matter what the peer sends.
async fn read_bounded_line<R>(reader: &mut R, max: usize) -> std::io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    let mut line: Vec<u8> = Vec::new();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            // EOF; an unterminated tail still counts as a frame.
            return Ok(if line.is_empty() {
                Line::Eof
            } else {
                Line::Frame(line)
            });
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) if line.len() + pos <= max => {
                line.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                return Ok(Line::Frame(line));
            }
            Some(pos) => {
                let total = line.len() + pos;
                reader.consume(pos + 1);
                return Ok(Line::Oversized(total));
            }
            None if line.len() + available.len() > max => {
                let mut total = line.len() + available.len();
                let seen = available.len();
                reader.consume(seen);
                drop(line);
                loop {
                    let chunk = reader.fill_buf().await?;
                    if chunk.is_empty() {
                        return Ok(Line::Eof);
                    }
                    if let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
                        total += pos;
                        reader.consume(pos + 1);
                        return Ok(Line::Oversized(total));
                    }
                    total += chunk.len();
                    let seen = chunk.len();
                    reader.consume(seen);
                }
            }
            None => {
                let seen = available.len();
                line.extend_from_slice(available);
                reader.consume(seen);
            }
        }
    }
}
