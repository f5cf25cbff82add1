use crate::api::{DetectionResponse, ErrorBody};
use crate::prelude::{DetectionError, DetectionOutcome};

/// Maps a received response onto a detection result or a terminal error.
///
/// Every outcome here is final: only a missing response is ever retried.
pub fn classify_response(status: u16, body: &[u8]) -> DetectionOutcome<DetectionResponse> {
    match status {
        200..=299 => serde_json::from_slice::<DetectionResponse>(body)
            .map_err(|err| DetectionError::MalformedResponse(err.to_string())),
        0 | 413 => Err(DetectionError::PayloadTooLarge),
        403 => Err(DetectionError::QuotaExceeded),
        _ => Err(DetectionError::ServerRejected(rejection_message(status, body))),
    }
}

fn rejection_message(status: u16, body: &[u8]) -> String {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_slice::<ErrorBody>(body)
    {
        return message;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("server returned status {}", status)
    } else {
        text.to_string()
    }
}
