use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Circuit breaker shared by every resource operation against one backend
/// target.
///
/// The breaker treats the retry-wrapped call as one unit: a logical call that
/// needed several transport attempts still records exactly one outcome.
/// While half-open, exactly one trial call is admitted; concurrent arrivals
/// are rejected as if the circuit were still open, and the next call is
/// admitted only after the trial resolves.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Configuration
    config: CircuitBreakerConfig,
    /// Current state
    state: Arc<RwLock<State>>,
    /// Backend identifier
    target: String,
}

#[derive(Debug)]
struct State {
    /// Current circuit state
    circuit_state: CircuitState,
    /// Number of consecutive failures in closed state
    consecutive_failures: u32,
    /// Whether the half-open trial call is in flight
    trial_in_flight: bool,
    /// Time when the circuit was opened
    opened_at: Option<Instant>,
    /// Metrics
    metrics: CircuitBreakerMetrics,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    pub fn new(target: String, config: CircuitBreakerConfig) -> Self {
        info!(
            backend = %target,
            failure_threshold = config.failure_threshold,
            cooldown_secs = config.cooldown_secs,
            "Creating circuit breaker"
        );

        Self {
            config,
            state: Arc::new(RwLock::new(State {
                circuit_state: CircuitState::Closed,
                consecutive_failures: 0,
                trial_in_flight: false,
                opened_at: None,
                metrics: CircuitBreakerMetrics::default(),
            })),
            target,
        }
    }

    /// Check if a logical call can proceed
    pub async fn can_proceed(&self) -> bool {
        let mut state = self.state.write().await;

        match state.circuit_state {
            CircuitState::Closed => {
                state.metrics.total_calls += 1;
                true
            }
            CircuitState::Open => {
                if let Some(opened_at) = state.opened_at {
                    if opened_at.elapsed() >= self.config.cooldown() {
                        // Cooldown elapsed, admit this call as the trial
                        self.transition_to_half_open(&mut state);
                        state.trial_in_flight = true;
                        state.metrics.total_calls += 1;
                        true
                    } else {
                        state.metrics.rejected_calls += 1;
                        debug!(
                            backend = %self.target,
                            time_remaining = ?self.config.cooldown() - opened_at.elapsed(),
                            "Circuit breaker open, rejecting call"
                        );
                        false
                    }
                } else {
                    // Should not happen, but handle gracefully
                    warn!(backend = %self.target, "Circuit open but no opened_at timestamp");
                    false
                }
            }
            CircuitState::HalfOpen => {
                if state.trial_in_flight {
                    state.metrics.rejected_calls += 1;
                    debug!(
                        backend = %self.target,
                        "Half-open trial already in flight, rejecting call"
                    );
                    false
                } else {
                    state.trial_in_flight = true;
                    state.metrics.total_calls += 1;
                    debug!(backend = %self.target, "Admitting half-open trial call");
                    true
                }
            }
        }
    }

    /// Record a successful logical call
    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        state.metrics.successful_calls += 1;

        match state.circuit_state {
            CircuitState::Closed => {
                state.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                state.trial_in_flight = false;
                debug!(backend = %self.target, "Half-open trial call succeeded");
                self.transition_to_closed(&mut state);
            }
            CircuitState::Open => {
                // Should not happen, but handle gracefully
                warn!(backend = %self.target, "Recording success in open state");
            }
        }
    }

    /// Record a failed logical call
    pub async fn record_failure(&self) {
        let mut state = self.state.write().await;
        state.metrics.failed_calls += 1;

        match state.circuit_state {
            CircuitState::Closed => {
                state.consecutive_failures += 1;

                debug!(
                    backend = %self.target,
                    consecutive_failures = state.consecutive_failures,
                    threshold = self.config.failure_threshold,
                    "Logical call failed in closed state"
                );

                if state.consecutive_failures >= self.config.failure_threshold {
                    self.transition_to_open(&mut state);
                }
            }
            CircuitState::HalfOpen => {
                state.trial_in_flight = false;
                warn!(
                    backend = %self.target,
                    "Half-open trial call failed, reopening circuit"
                );
                self.transition_to_open(&mut state);
            }
            CircuitState::Open => {
                // Should not happen, but handle gracefully
                debug!(backend = %self.target, "Recording failure in open state");
            }
        }
    }

    /// Get current state
    pub async fn state(&self) -> CircuitState {
        self.state.read().await.circuit_state
    }

    /// Get the consecutive-failure count
    pub async fn consecutive_failures(&self) -> u32 {
        self.state.read().await.consecutive_failures
    }

    /// Get metrics
    pub async fn metrics(&self) -> CircuitBreakerMetrics {
        self.state.read().await.metrics.clone()
    }

    /// Transition to open state with a fresh `opened_at`
    fn transition_to_open(&self, state: &mut State) {
        info!(
            backend = %self.target,
            consecutive_failures = state.consecutive_failures,
            "Circuit breaker opening"
        );

        state.circuit_state = CircuitState::Open;
        state.opened_at = Some(Instant::now());
        state.consecutive_failures = 0;
        state.trial_in_flight = false;
        state.metrics.circuit_opened_count += 1;
    }

    /// Transition to half-open state
    fn transition_to_half_open(&self, state: &mut State) {
        info!(
            backend = %self.target,
            cooldown = ?self.config.cooldown(),
            "Circuit breaker transitioning to half-open"
        );

        state.circuit_state = CircuitState::HalfOpen;
        state.consecutive_failures = 0;
        state.trial_in_flight = false;
        state.metrics.circuit_half_opened_count += 1;
    }

    /// Transition to closed state
    fn transition_to_closed(&self, state: &mut State) {
        info!(backend = %self.target, "Circuit breaker closing");

        state.circuit_state = CircuitState::Closed;
        state.opened_at = None;
        state.consecutive_failures = 0;
        state.trial_in_flight = false;
        state.metrics.circuit_closed_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn breaker(config: CircuitBreakerConfig) -> CircuitBreaker {
        CircuitBreaker::new("http://test-backend:8080".to_string(), config)
    }

    #[tokio::test]
    async fn test_circuit_breaker_starts_closed() {
        let cb = breaker(CircuitBreakerConfig::default());
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert!(cb.can_proceed().await);
    }

    #[tokio::test]
    async fn test_circuit_opens_after_threshold_failures() {
        let config = CircuitBreakerConfig {
            failure_threshold: 3,
            ..Default::default()
        };
        let cb = breaker(config);

        for _ in 0..3 {
            assert!(cb.can_proceed().await);
            cb.record_failure().await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(!cb.can_proceed().await);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let config = CircuitBreakerConfig {
            failure_threshold: 3,
            ..Default::default()
        };
        let cb = breaker(config);

        for _ in 0..2 {
            assert!(cb.can_proceed().await);
            cb.record_failure().await;
        }
        assert_eq!(cb.consecutive_failures().await, 2);

        assert!(cb.can_proceed().await);
        cb.record_success().await;
        assert_eq!(cb.consecutive_failures().await, 0);
        assert_eq!(cb.state().await, CircuitState::Closed);

        // Threshold starts over after the reset
        for _ in 0..3 {
            assert!(cb.can_proceed().await);
            cb.record_failure().await;
        }
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_half_open_admits_single_trial() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            cooldown_secs: 0,
        };
        let cb = breaker(config);

        for _ in 0..2 {
            assert!(cb.can_proceed().await);
            cb.record_failure().await;
        }
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(10)).await;

        // First arrival becomes the trial
        assert!(cb.can_proceed().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        // Everyone else is rejected while the trial is in flight
        assert!(!cb.can_proceed().await);
        assert!(!cb.can_proceed().await);

        // Trial resolves, the next call is admitted again
        cb.record_success().await;
        assert!(cb.can_proceed().await);
    }

    #[tokio::test]
    async fn test_concurrent_arrivals_admit_one_trial() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown_secs: 0,
        };
        let cb = breaker(config);

        assert!(cb.can_proceed().await);
        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(10)).await;

        let (a, b, c) = tokio::join!(cb.can_proceed(), cb.can_proceed(), cb.can_proceed());
        let admitted = [a, b, c].iter().filter(|ok| **ok).count();
        assert_eq!(admitted, 1);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_half_open_closes_on_success() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            cooldown_secs: 0,
        };
        let cb = breaker(config);

        for _ in 0..2 {
            assert!(cb.can_proceed().await);
            cb.record_failure().await;
        }
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cb.can_proceed().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        cb.record_success().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert_eq!(cb.consecutive_failures().await, 0);
    }

    #[tokio::test]
    async fn test_half_open_reopens_on_failure() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            cooldown_secs: 0,
        };
        let cb = breaker(config);
        for _ in 0..2 {
            assert!(cb.can_proceed().await);
            cb.record_failure().await;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cb.can_proceed().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_metrics_tracking() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            ..Default::default()
        };
        let cb = breaker(config);

        assert!(cb.can_proceed().await);
        cb.record_success().await;

        assert!(cb.can_proceed().await);
        cb.record_failure().await;

        assert!(cb.can_proceed().await);
        cb.record_failure().await;

        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(!cb.can_proceed().await);

        let metrics = cb.metrics().await;
        assert_eq!(metrics.total_calls, 3);
        assert_eq!(metrics.successful_calls, 1);
        assert_eq!(metrics.failed_calls, 2);
        assert_eq!(metrics.rejected_calls, 1);
        assert_eq!(metrics.circuit_opened_count, 1);
    }
}
