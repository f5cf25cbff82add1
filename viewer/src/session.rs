use snapcore::capture::CapturedImage;
use snapcore::{Detection, DetectionError, DetectionResponse};

/// Where the capture cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Detecting,
    Detected,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} while {state:?}")]
pub struct TransitionError {
    pub action: &'static str,
    pub state: SessionState,
}

/// Capture cycle owned by the front end:
/// Idle -> Capturing -> Detecting -> Detected, and back to Idle on retake.
///
/// Every capture gets a new generation; detection results tagged with an
/// older generation belong to a discarded capture and are dropped.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    capture: Option<CapturedImage>,
    generation: u64,
    detections: Vec<Detection>,
    error: Option<DetectionError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            capture: None,
            generation: 0,
            detections: Vec::new(),
            error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn capture(&self) -> Option<&CapturedImage> {
        self.capture.as_ref()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn error(&self) -> Option<&DetectionError> {
        self.error.as_ref()
    }

    /// The capture trigger is live only between cycles.
    pub fn can_capture(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn can_retake(&self) -> bool {
        self.capture.is_some()
    }

    pub fn begin_capture(&mut self) -> Result<(), TransitionError> {
        self.require(SessionState::Idle, "capture")?;
        self.state = SessionState::Capturing;
        Ok(())
    }

    /// Stores the new capture and starts detecting; returns its generation.
    pub fn capture_succeeded(&mut self, image: CapturedImage) -> Result<u64, TransitionError> {
        self.require(SessionState::Capturing, "store a capture")?;
        self.generation += 1;
        self.capture = Some(image);
        self.detections.clear();
        self.error = None;
        self.state = SessionState::Detecting;
        Ok(self.generation)
    }

    pub fn capture_failed(&mut self) {
        if self.state == SessionState::Capturing {
            self.state = SessionState::Idle;
        }
    }

    /// Applies a detection result. Returns false when the result is stale or
    /// arrives outside `Detecting`.
    pub fn detection_finished(
        &mut self,
        generation: u64,
        outcome: Result<DetectionResponse, DetectionError>,
    ) -> bool {
        if self.state != SessionState::Detecting || generation != self.generation {
            log::debug!(
                "dropping detection result for generation {} (current {}, {:?})",
                generation,
                self.generation,
                self.state
            );
            return false;
        }
        match outcome {
            Ok(response) => self.detections = response.predictions,
            Err(err) => self.error = Some(err),
        }
        self.state = SessionState::Detected;
        true
    }

    /// Discards the capture and its detections and returns to `Idle`.
    pub fn retake(&mut self) {
        if let Some(image) = self.capture.take() {
            if let Err(err) = image.discard() {
                log::warn!("could not remove capture: {}", err);
            }
        }
        self.generation += 1;
        self.detections.clear();
        self.error = None;
        self.state = SessionState::Idle;
    }

    fn require(&self, state: SessionState, action: &'static str) -> Result<(), TransitionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(TransitionError {
                action,
                state: self.state,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn capture_into(session: &mut Session, image: CapturedImage) -> u64 {
        session.begin_capture().unwrap();
        session.capture_succeeded(image).unwrap()
    }

    #[test]
    fn full_cycle_reaches_detected() {
        let mut session = Session::new();
        assert!(session.can_capture());
        let generation = capture_into(&mut session, CapturedImage::new("a.jpg", 10, 10));
        assert_eq!(session.state(), SessionState::Detecting);
        assert!(!session.can_capture());

        let response = DetectionResponse::new(vec![Detection::new("cat", 0, 1.0, 1.0, 2.0, 2.0)]);
        assert!(session.detection_finished(generation, Ok(response)));
        assert_eq!(session.state(), SessionState::Detected);
        assert_eq!(session.detections().len(), 1);
        assert!(!session.can_capture());
    }

    #[test]
    fn capture_is_refused_while_detecting() {
        let mut session = Session::new();
        capture_into(&mut session, CapturedImage::new("a.jpg", 10, 10));
        assert_eq!(
            session.begin_capture(),
            Err(TransitionError {
                action: "capture",
                state: SessionState::Detecting,
            })
        );
    }

    #[test]
    fn failed_capture_returns_to_idle() {
        let mut session = Session::new();
        session.begin_capture().unwrap();
        session.capture_failed();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.capture().is_none());
    }

    #[test]
    fn terminal_error_is_kept_for_display() {
        let mut session = Session::new();
        let generation = capture_into(&mut session, CapturedImage::new("a.jpg", 10, 10));
        assert!(session.detection_finished(generation, Err(DetectionError::QuotaExceeded)));
        assert_eq!(session.error(), Some(&DetectionError::QuotaExceeded));
        assert!(session.detections().is_empty());
    }

    #[test]
    fn retake_removes_file_and_drops_late_results() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture-0001.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let mut session = Session::new();
        let generation = capture_into(&mut session, CapturedImage::new(&path, 10, 10));
        session.retake();
        assert!(!path.exists());
        assert_eq!(session.state(), SessionState::Idle);

        let late = DetectionResponse::new(vec![Detection::new("cat", 0, 1.0, 1.0, 2.0, 2.0)]);
        assert!(!session.detection_finished(generation, Ok(late)));
        assert!(session.detections().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn stale_generation_is_ignored_after_recapture() {
        let mut session = Session::new();
        let first = capture_into(&mut session, CapturedImage::new("a.jpg", 10, 10));
        session.retake();
        let second = capture_into(&mut session, CapturedImage::new("b.jpg", 10, 10));
        assert_ne!(first, second);
        assert!(!session.detection_finished(first, Ok(DetectionResponse::default())));
        assert_eq!(session.state(), SessionState::Detecting);
        assert!(session.detection_finished(second, Ok(DetectionResponse::default())));
    }
}
