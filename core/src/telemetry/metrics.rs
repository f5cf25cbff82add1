use std::sync::Mutex;

/// Request counters for one detection client.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub attempts: usize,
    pub retries: usize,
    pub exhausted: usize,
    pub rejected: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_attempt(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.attempts += 1;
        }
    }

    pub fn record_retry(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.retries += 1;
        }
    }

    pub fn record_exhausted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.exhausted += 1;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_attempt();
        recorder.record_attempt();
        recorder.record_retry();
        recorder.record_rejected();
        assert_eq!(
            recorder.snapshot(),
            Metrics {
                attempts: 2,
                retries: 1,
                exhausted: 0,
                rejected: 1,
            }
        );
    }
}
