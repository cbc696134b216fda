//! GraphGate: a multi-transport RPC gateway for a graph database engine.
//!
//! One logical namespace of methods (`"<entity>/<action>"`) is registered
//! once in a [`registry::MethodRegistry`] and exposed uniformly over HTTP,
//! newline-delimited TCP, and WebSocket. Every transport decodes into the
//! same [`envelope::RequestEnvelope`], routes through the same
//! [`dispatch::Dispatcher`], and reports failures from the same
//! [`error::GateError`] taxonomy.
//!
//! The graph engine behind the methods is an [`sdk::GraphClient`] trait
//! object; [`sdk::MemoryGraph`] backs the shipped binary and the tests.

pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod sdk;
pub mod transport;
