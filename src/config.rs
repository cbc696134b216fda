//! Gateway configuration.
//!
//! Every knob has an environment variable and a default; the CLI in `main`
//! layers its flags on top. Invalid values fail startup loudly rather than
//! falling back silently.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Raised when an environment variable holds an unparseable value.
#[derive(Debug, Error)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    /// The offending variable name
    pub var: &'static str,
    /// Why the value was rejected
    pub reason: String,
}

/// Runtime configuration for all three listeners and the dispatcher.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP listen address (`GRAPHGATE_HTTP_ADDR`)
    pub http_addr: SocketAddr,
    /// TCP listen address (`GRAPHGATE_TCP_ADDR`)
    pub tcp_addr: SocketAddr,
    /// WebSocket listen address (`GRAPHGATE_WS_ADDR`)
    pub ws_addr: SocketAddr,
    /// Maximum HTTP body size in bytes (`GRAPHGATE_MAX_BODY_BYTES`)
    pub max_body_bytes: usize,
    /// Maximum TCP line / WebSocket frame size in bytes
    /// (`GRAPHGATE_MAX_FRAME_BYTES`)
    pub max_frame_bytes: usize,
    /// Concurrent in-flight HTTP dispatches before shedding
    /// (`GRAPHGATE_MAX_CONCURRENCY`)
    pub max_concurrency: usize,
    /// Per-call dispatch timeout; `None` disables it
    /// (`GRAPHGATE_DISPATCH_TIMEOUT_MS`, `0` to disable)
    pub dispatch_timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            tcp_addr: SocketAddr::from(([127, 0, 0, 1], 9090)),
            ws_addr: SocketAddr::from(([127, 0, 0, 1], 9091)),
            max_body_bytes: 1024 * 1024,
            max_frame_bytes: 1024 * 1024,
            max_concurrency: 256,
            dispatch_timeout: Some(Duration::from_secs(30)),
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl GatewayConfig {
    /// Load configuration from `GRAPHGATE_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_ms: u64 = parse_var(
            "GRAPHGATE_DISPATCH_TIMEOUT_MS",
            defaults
                .dispatch_timeout
                .map_or(0, |d| d.as_millis() as u64),
        )?;
        Ok(Self {
            http_addr: parse_var("GRAPHGATE_HTTP_ADDR", defaults.http_addr)?,
            tcp_addr: parse_var("GRAPHGATE_TCP_ADDR", defaults.tcp_addr)?,
            ws_addr: parse_var("GRAPHGATE_WS_ADDR", defaults.ws_addr)?,
            max_body_bytes: parse_var("GRAPHGATE_MAX_BODY_BYTES", defaults.max_body_bytes)?,
            max_frame_bytes: parse_var("GRAPHGATE_MAX_FRAME_BYTES", defaults.max_frame_bytes)?,
            max_concurrency: parse_var("GRAPHGATE_MAX_CONCURRENCY", defaults.max_concurrency)?,
            dispatch_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.http_addr.port(), 8080);
        assert_eq!(cfg.max_body_bytes, 1024 * 1024);
        assert_eq!(cfg.dispatch_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_timeout_disables_the_deadline() {
        // Environment-variable tests race with each other in a parallel
        // harness, so exercise the conversion directly.
        let timeout_ms: u64 = 0;
        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        assert!(timeout.is_none());
    }
}
