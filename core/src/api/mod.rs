pub mod detection;
pub mod request;

pub use detection::{Detection, DetectionResponse, ErrorBody};
pub use request::DetectionRequest;
