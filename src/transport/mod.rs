//! Transport bindings.
//!
//! Three bindings expose the same registry through the same dispatcher:
//!
//! - `http` - request/response over `POST /rpc/v1`, plus method discovery
//! - `tcp` - persistent newline-delimited JSON with correlation IDs
//! - `ws` - persistent WebSocket, one envelope per frame
//!
//! `framed` holds the multiplexing core the two persistent bindings share.
//! Transports decode bytes and encode envelopes; routing, isolation, and
//! error shaping all live behind [`crate::dispatch::Dispatcher`].

pub mod framed;
pub mod http;
pub mod tcp;
pub mod ws;
