//! Core of the snapdetect camera tools.
//!
//! A captured photo goes to a remote detection endpoint through
//! [`client::DetectionClient`]; the returned boxes are scaled onto the
//! displayed image and painted by [`overlay::OverlayRenderer`].

pub mod api;
pub mod capture;
pub mod client;
pub mod geometry;
pub mod overlay;
pub mod prelude;
pub mod telemetry;

pub use api::{Detection, DetectionResponse};
pub use client::{DetectionClient, DetectionParams};
pub use overlay::{DisplayList, OverlayRenderer};
pub use prelude::{DetectionError, Surface};
