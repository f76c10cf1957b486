use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u8 = 1;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// bounds automatic resends after a network-level failure; timeouts and
/// error statuses are never retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u8,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new() -> Self {
        RetryPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }
}

impl std::default::Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new()
    }
}
