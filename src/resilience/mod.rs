pub mod breaker;
pub mod executor;
pub mod retry;
pub mod types;

pub use breaker::CircuitBreaker;
pub use executor::ResilientExecutor;
pub use retry::RetryExecutor;
pub use types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, RetryConfig};
