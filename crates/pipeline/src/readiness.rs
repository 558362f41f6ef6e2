//! Readiness handshake: bounded connect-retry with exponential backoff.
//!
//! After a server is acquired (provisioned or adopted), the pipeline
//! polls it with [`wait_until_ready`] until it accepts a connection or
//! the deadline passes. Downstream phases only ever see a server that
//! answered.

use std::sync::Arc;
use std::time::Duration;

use seedbed_runtime::connection::{Connection, ConnectionError, Connector, Credentials, ServerAddress};
use tokio::time::Instant;

/// Tunable parameters for the readiness handshake.
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Delay before the second connection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Overall deadline. Once it passes, the handshake gives up with the
    /// last connection error.
    pub timeout: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// The server never accepted a connection within the deadline.
#[derive(Debug, thiserror::Error)]
#[error("Server at {address} not ready after {waited_ms}ms: {last_error}")]
pub struct ReadinessError {
    pub address: String,
    pub waited_ms: u64,
    #[source]
    pub last_error: ConnectionError,
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ReadinessConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReadinessConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Poll the server until it accepts a connection.
///
/// Returns the first successful connection. Gives up once
/// [`ReadinessConfig::timeout`] has elapsed, surfacing the last
/// connection error.
pub async fn wait_until_ready(
    connector: &dyn Connector,
    address: &ServerAddress,
    credentials: &Credentials,
    config: &ReadinessConfig,
) -> Result<Arc<dyn Connection>, ReadinessError> {
    let started = Instant::now();
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match connector.connect(address, credentials).await {
            Ok(connection) => {
                tracing::info!(address = %address, attempt, "Server ready");
                return Ok(connection);
            }
            Err(e) => {
                let waited = started.elapsed();
                if waited >= config.timeout {
                    tracing::error!(
                        address = %address,
                        attempt,
                        waited_ms = waited.as_millis() as u64,
                        error = %e,
                        "Server never became ready",
                    );
                    return Err(ReadinessError {
                        address: address.to_string(),
                        waited_ms: waited.as_millis() as u64,
                        last_error: e,
                    });
                }
                tracing::warn!(
                    address = %address,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Server not ready yet, retrying",
                );
            }
        }

        tokio::time::sleep(delay).await;
        delay = next_delay(delay, config);
    }
}
