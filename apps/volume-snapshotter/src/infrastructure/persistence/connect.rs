//! Startup Connectivity Probe
//!
//! The store must answer a trivial query before the first cycle runs. The
//! probe is retried a fixed number of times with a fixed delay; running out
//! of attempts is fatal for the process.

use std::future::Future;
use std::time::Duration;

use crate::application::ports::StartupConnectivityError;

/// Probe retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRetry {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for ConnectRetry {
    fn default() -> Self {
        Self {
            max_attempts: 11,
            delay: Duration::from_secs(2),
        }
    }
}

/// Run `probe` until it succeeds or the attempts are exhausted.
///
/// No delay follows the final failed attempt.
pub async fn probe_with_retry<F, Fut, E>(
    retry: ConnectRetry,
    mut probe: F,
) -> Result<u32, StartupConnectivityError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match probe().await {
            Ok(()) => {
                tracing::info!(attempt, "Database reachable");
                return Ok(attempt);
            }
            Err(e) => {
                last_error = e.to_string();
                if attempt < max_attempts {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = retry.delay.as_millis(),
                        error = %e,
                        "Error opening database, retrying"
                    );
                    tokio::time::sleep(retry.delay).await;
                }
            }
        }
    }

    Err(StartupConnectivityError {
        attempts: max_attempts,
        last_error,
    })
}
