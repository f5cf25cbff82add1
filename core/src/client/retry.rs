use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed backoff: `initial_delay` before the first retry, `retry_delay`
/// before every retry after that. The delay never grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::ZERO,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            retry_delay,
        }
    }

    pub fn start(&self) -> RetryState {
        RetryState {
            remaining: self.max_retries,
            delay: self.initial_delay,
            retry_delay: self.retry_delay,
        }
    }

    /// Every wait the policy can insert, in order. Its length is `max_retries`.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> {
        let mut state = self.start();
        std::iter::from_fn(move || state.next_delay())
    }
}

/// Loop state carried between attempts: retries left and the next wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    remaining: u32,
    delay: Duration,
    retry_delay: Duration,
}

impl RetryState {
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consumes one retry and returns how long to wait before it, or `None`
    /// once retries are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let delay = self.delay;
        self.delay = self.retry_delay;
        Some(delay)
    }
}
