use super::types::RetryConfig;
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use tracing::{debug, warn};

/// Retry executor with bounded exponential backoff.
///
/// Purely a control-flow combinator: only errors accepted by the caller's
/// predicate are retried, everything else propagates immediately without
/// consuming remaining attempts. If the final attempt still fails with a
/// retryable error, that error is re-raised to the caller.
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an operation, retrying errors that match the predicate
    pub async fn execute<F, Fut, T, E, P>(&self, mut f: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(
                attempt,
                max_attempts = self.config.max_attempts,
                "Executing backend call"
            );

            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(attempt, "Backend call succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if !should_retry(&e) {
                        debug!(attempt, error = %e, "Fault not retryable");
                        return Err(e);
                    }

                    if attempt >= self.config.max_attempts {
                        warn!(
                            attempt,
                            max_attempts = self.config.max_attempts,
                            error = %e,
                            "Backend call failed after max attempts"
                        );
                        return Err(e);
                    }

                    if let Some(wait) = backoff.next_backoff() {
                        debug!(
                            attempt,
                            wait_ms = wait.as_millis() as u64,
                            error = %e,
                            "Transient fault, retrying after backoff"
                        );
                        tokio::time::sleep(wait).await;
                    } else {
                        warn!(attempt, error = %e, "Backoff exhausted");
                        return Err(e);
                    }
                }
            }
        }
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.config.first_delay())
            // Delays must be deterministic and non-decreasing
            .with_randomization_factor(0.0)
            .with_multiplier(2.0)
            .with_max_interval(self.config.max_delay())
            .with_max_elapsed_time(None) // Attempt count is bounded above
            .build()
    }
}
