//! Detection request lifecycle: one multipart POST per attempt, classified
//! failures surface at once, missing responses retry on a fixed backoff.

pub mod classify;
pub mod retry;
pub mod transport;

pub use classify::classify_response;
pub use retry::{RetryPolicy, RetryState};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};

use crate::api::{DetectionRequest, DetectionResponse};
use crate::capture::CapturedImage;
use crate::prelude::{DetectionError, DetectionOutcome};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use std::time::Duration;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

/// Per-call knobs of `DetectionClient::detect`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_retries: retry::DEFAULT_MAX_RETRIES,
            initial_delay: Duration::ZERO,
        }
    }
}

pub struct DetectionClient<T> {
    transport: T,
    retry_delay: Duration,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl DetectionClient<HttpTransport> {
    /// Client posting to `endpoint` with transport-default timeouts.
    pub fn http(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self::new(HttpTransport::new(endpoint)?))
    }
}

impl<T: Transport> DetectionClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry_delay: retry::DEFAULT_RETRY_DELAY,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("detection-client"),
        }
    }

    /// Overrides the constant wait inserted before the second and later retries.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    pub fn retry_policy(&self, params: &DetectionParams) -> RetryPolicy {
        RetryPolicy::new(params.max_retries, params.initial_delay, self.retry_delay)
    }

    /// Reads the captured file and runs `detect_request` on it.
    pub async fn detect(
        &self,
        image: &CapturedImage,
        params: &DetectionParams,
    ) -> DetectionOutcome<DetectionResponse> {
        let request = DetectionRequest::from_capture(
            image,
            params.confidence_threshold,
            params.iou_threshold,
        )?;
        self.detect_request(&request, params).await
    }

    /// Posts `request` until a response arrives or retries run out.
    ///
    /// Exhausting every retry yields an empty response, never an error.
    pub async fn detect_request(
        &self,
        request: &DetectionRequest,
        params: &DetectionParams,
    ) -> DetectionOutcome<DetectionResponse> {
        let mut state = self.retry_policy(params).start();
        loop {
            self.metrics.record_attempt();
            match self.transport.send(request).await {
                Ok(response) => {
                    self.logger.trace(&format!(
                        "status {} with {} body bytes",
                        response.status,
                        response.body.len()
                    ));
                    let outcome = classify_response(response.status, &response.body);
                    match &outcome {
                        Ok(result) => self.logger.record(&format!(
                            "{} predictions for {}",
                            result.predictions.len(),
                            request.file_name
                        )),
                        Err(err) => {
                            self.metrics.record_rejected();
                            self.logger
                                .warn(&format!("request rejected ({}): {}", err.kind(), err));
                        }
                    }
                    return outcome;
                }
                Err(err) if !err.is_retryable() => {
                    self.metrics.record_rejected();
                    self.logger.warn(&format!("{}; not retrying", err));
                    return Err(DetectionError::InvalidRequest(err.to_string()));
                }
                Err(err) => match state.next_delay() {
                    Some(delay) => {
                        self.logger.warn(&format!(
                            "{}; retrying in {:?} ({} left)",
                            err,
                            delay,
                            state.remaining()
                        ));
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        self.metrics.record_retry();
                    }
                    None => {
                        self.metrics.record_exhausted();
                        self.logger
                            .warn(&format!("{}; retries exhausted, reporting no detections", err));
                        return Ok(DetectionResponse::default());
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Detection;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted outcomes; once the script runs dry every send fails.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
        sends: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<RawResponse, TransportError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                sends: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self::new(Vec::new())
        }

        fn sends(&self) -> usize {
            self.sends.load(Ordering::SeqCst)
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, _request: &DetectionRequest) -> Result<RawResponse, TransportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::NoResponse("connection refused".into())))
        }
    }

    fn request() -> DetectionRequest {
        DetectionRequest::new(vec![0xFF, 0xD8], "shot.jpg", 0.25, 0.45)
    }

    fn status(status: u16, body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_failure_retries_exactly_max_times_then_returns_empty() {
        let client = DetectionClient::new(ScriptedTransport::failing());
        let params = DetectionParams {
            max_retries: 4,
            ..Default::default()
        };
        let started = tokio::time::Instant::now();
        let response = client.detect_request(&request(), &params).await.unwrap();

        assert!(response.is_empty());
        assert_eq!(client.transport().sends(), 5);
        let metrics = client.metrics();
        assert_eq!(metrics.retries, 4);
        assert_eq!(metrics.exhausted, 1);
        // 0s before the first retry, then 2s before each of the other three.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn quota_error_is_never_retried() {
        let client = DetectionClient::new(ScriptedTransport::new(vec![status(403, "")]));
        let outcome = client
            .detect_request(&request(), &DetectionParams::default())
            .await;

        assert_eq!(outcome, Err(DetectionError::QuotaExceeded));
        assert_eq!(client.transport().sends(), 1);
        assert_eq!(client.metrics().retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn classified_error_after_transient_failures_stops_the_loop() {
        let client = DetectionClient::new(ScriptedTransport::new(vec![
            Err(TransportError::NoResponse("timeout".into())),
            status(413, ""),
            status(200, r#"{"predictions":[]}"#),
        ]));
        let outcome = client
            .detect_request(&request(), &DetectionParams::default())
            .await;

        assert_eq!(outcome, Err(DetectionError::PayloadTooLarge));
        assert_eq!(client.transport().sends(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_once_endpoint_answers() {
        let body = serde_json::to_string(&DetectionResponse::new(vec![Detection::new(
            "cat", 0, 10.0, 10.0, 100.0, 50.0,
        )]))
        .unwrap();
        let client = DetectionClient::new(ScriptedTransport::new(vec![
            Err(TransportError::NoResponse("reset".into())),
            Err(TransportError::NoResponse("reset".into())),
            status(200, &body),
        ]))
        .with_retry_delay(Duration::from_millis(10));
        let response = client
            .detect_request(&request(), &DetectionParams::default())
            .await
            .unwrap();

        assert_eq!(response.predictions.len(), 1);
        assert_eq!(client.metrics().attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let client = DetectionClient::new(ScriptedTransport::failing());
        let params = DetectionParams {
            max_retries: 0,
            ..Default::default()
        };
        let response = client.detect_request(&request(), &params).await.unwrap();
        assert!(response.is_empty());
        assert_eq!(client.transport().sends(), 1);
    }

    #[tokio::test]
    async fn unreadable_capture_is_an_invalid_request() {
        let client = DetectionClient::new(ScriptedTransport::failing());
        let image = CapturedImage::new("/nonexistent/snap.jpg", 10, 10);
        let outcome = client.detect(&image, &DetectionParams::default()).await;
        assert!(matches!(outcome, Err(DetectionError::InvalidRequest(_))));
        assert_eq!(client.transport().sends(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn encode_failure_is_not_retried() {
        let client = DetectionClient::new(ScriptedTransport::new(vec![Err(
            TransportError::Encode("image part: invalid mime".into()),
        )]));
        let outcome = client
            .detect_request(&request(), &DetectionParams::default())
            .await;
        assert!(matches!(outcome, Err(DetectionError::InvalidRequest(_))));
        assert_eq!(client.transport().sends(), 1);
        assert_eq!(client.metrics().retries, 0);
    }
}
