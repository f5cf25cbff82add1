use iced::{
    widget::{button, column, image, row, scrollable, stack, text, text_input, Canvas, Column, Container},
    Alignment, Element, Length, Task, Theme,
};
use overlay_canvas::OverlayCanvas;
use session::{Session, SessionState};
use snapcore::capture::{CaptureDevice, CapturedImage, FileCapture};
use snapcore::client::{DetectionClient, DetectionParams, HttpTransport};
use snapcore::geometry::DisplayGeometry;
use snapcore::overlay::{DisplayList, OverlayRenderer};
use snapcore::{DetectionError, DetectionResponse};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

mod overlay_canvas;
mod session;

const DEFAULT_DISPLAY_WIDTH: f32 = 640.0;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Viewer::boot, Viewer::update, Viewer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Viewer) -> String {
    "Snapdetect Viewer".into()
}

fn application_theme(_: &Viewer) -> Theme {
    Theme::Dark
}

/// Startup settings read from the environment.
#[derive(Debug, Clone)]
struct ViewerConfig {
    endpoint: Option<String>,
    display_width: f32,
    spool_dir: PathBuf,
}

impl ViewerConfig {
    fn from_env() -> Self {
        let display_width = std::env::var("SNAPVIEWER_DISPLAY_WIDTH")
            .ok()
            .and_then(|value| value.parse::<f32>().ok())
            .filter(|width| width.is_finite() && *width > 0.0)
            .unwrap_or(DEFAULT_DISPLAY_WIDTH);
        Self {
            endpoint: std::env::var("DETECTION_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            display_width,
            spool_dir: std::env::temp_dir().join("snapviewer"),
        }
    }
}

struct Viewer {
    config: ViewerConfig,
    client: Option<Arc<DetectionClient<HttpTransport>>>,
    device: Arc<Mutex<FileCapture>>,
    source_input: String,
    session: Session,
    renderer: OverlayRenderer,
    overlay: DisplayList,
    geometry: Option<DisplayGeometry>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    SourceChanged(String),
    Capture,
    Captured(Result<CapturedImage, String>),
    DetectionFinished(u64, Result<DetectionResponse, DetectionError>),
    Retake,
}

impl Viewer {
    fn boot() -> (Self, Task<Message>) {
        let config = ViewerConfig::from_env();
        let client = match config
            .endpoint
            .as_deref()
            .map(|url| DetectionClient::<HttpTransport>::http(url))
        {
            Some(Ok(client)) => Some(Arc::new(client)),
            Some(Err(err)) => {
                log::error!("detection client unavailable: {}", err);
                None
            }
            None => None,
        };
        let status = if client.is_some() {
            "Pick an image and capture.".to_string()
        } else {
            "Set DETECTION_URL to enable detection.".to_string()
        };
        (
            Viewer {
                device: Arc::new(Mutex::new(FileCapture::new(
                    PathBuf::new(),
                    config.spool_dir.clone(),
                ))),
                config,
                client,
                source_input: String::new(),
                session: Session::new(),
                renderer: OverlayRenderer::default(),
                overlay: DisplayList::new(),
                geometry: None,
                status,
                history: Vec::new(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::SourceChanged(value) => {
                state.source_input = value;
                Task::none()
            }
            Message::Capture => state.capture(),
            Message::Captured(Ok(image)) => state.detect(image),
            Message::Captured(Err(err)) => {
                log::warn!("capture failed: {}", err);
                state.session.capture_failed();
                state.status = format!("Capture failed: {}", err);
                Task::none()
            }
            Message::DetectionFinished(generation, outcome) => {
                let summary = match &outcome {
                    Ok(response) if response.is_empty() => "No detections found".to_string(),
                    Ok(response) => format!("{} detections", response.predictions.len()),
                    Err(err) => err.to_string(),
                };
                if state.session.detection_finished(generation, outcome) {
                    state.status = summary.clone();
                    state.push_history(summary);
                    state.redraw_overlay();
                }
                Task::none()
            }
            Message::Retake => {
                state.session.retake();
                state.overlay = DisplayList::new();
                state.geometry = None;
                state.status = "Ready for a new capture.".into();
                Task::none()
            }
        }
    }

    fn capture(&mut self) -> Task<Message> {
        if self.client.is_none() {
            self.status = "Set DETECTION_URL to enable detection.".into();
            return Task::none();
        }
        if let Err(err) = self.session.begin_capture() {
            log::debug!("{}", err);
            return Task::none();
        }
        self.status = "Capturing...".into();

        // Spooling blocks on a file copy and a header decode.
        let device = self.device.clone();
        let source = self.source_input.trim().to_string();
        Task::perform(
            async move {
                let spooled = tokio::task::spawn_blocking(move || -> Result<CapturedImage, String> {
                    let mut device = device
                        .lock()
                        .map_err(|_| "capture device poisoned".to_string())?;
                    device.set_source(source);
                    device.capture().map_err(|err| err.to_string())
                })
                .await;
                match spooled {
                    Ok(result) => result,
                    Err(err) => Err(err.to_string()),
                }
            },
            Message::Captured,
        )
    }

    fn detect(&mut self, image: CapturedImage) -> Task<Message> {
        let Some(client) = self.client.clone() else {
            self.session.capture_failed();
            return Task::none();
        };
        self.geometry = match DisplayGeometry::fit_width(&image, self.config.display_width) {
            Ok(geometry) => Some(geometry),
            Err(err) => {
                log::warn!("cannot lay out capture: {}", err);
                None
            }
        };
        let generation = match self.session.capture_succeeded(image.clone()) {
            Ok(generation) => generation,
            Err(err) => {
                log::warn!("{}", err);
                return Task::none();
            }
        };
        self.overlay = DisplayList::new();
        self.status = "Detecting...".into();
        self.push_history(format!("Captured {}", image.path().display()));

        Task::perform(
            async move {
                client
                    .detect(&image, &DetectionParams::default())
                    .await
            },
            move |outcome| Message::DetectionFinished(generation, outcome),
        )
    }

    fn redraw_overlay(&mut self) {
        let (Some(geometry), Some(image)) = (self.geometry, self.session.capture()) else {
            return;
        };
        let scale = match geometry.scale(image.original_width()) {
            Ok(scale) => scale,
            Err(err) => {
                log::warn!("cannot scale detections: {}", err);
                return;
            }
        };
        self.renderer.render(
            &mut self.overlay,
            self.session.detections(),
            scale,
            geometry.displayed_width,
            geometry.displayed_height,
        );
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let capture_button = button("Capture")
            .on_press_maybe(
                (state.client.is_some() && state.session.can_capture()).then_some(Message::Capture),
            )
            .padding(10);
        let retake_button = button("Retake")
            .on_press_maybe(state.session.can_retake().then_some(Message::Retake))
            .padding(10);

        let controls = column![
            text("Snapdetect").size(26),
            text_input("Image path", &state.source_input)
                .on_input(Message::SourceChanged)
                .padding(6),
            row![capture_button, retake_button].spacing(10),
            text(&state.status).size(14),
            text(format!("Session: {:?}", state.session.state())).size(12),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(320.0));
        let controls = match state.session.error() {
            Some(err) => controls.push(text(format!("Detection failed: {}", err)).size(12)),
            None => controls,
        };

        let preview: Element<'_, Message> =
            match (state.session.capture(), state.geometry) {
                (Some(capture), Some(geometry)) => {
                    let width = Length::Fixed(geometry.displayed_width);
                    let height = Length::Fixed(geometry.displayed_height);
                    let photo = image(image::Handle::from_path(capture.path()))
                        .width(width)
                        .height(height);
                    let overlay = Canvas::new(OverlayCanvas::new(&state.overlay))
                        .width(width)
                        .height(height);
                    let mut layers = column![stack![photo, overlay]].spacing(6);
                    if state.session.state() == SessionState::Detecting {
                        layers = layers.push(text("Waiting for the detection service...").size(14));
                    }
                    layers.into()
                }
                _ => text("No capture yet").size(14).into(),
            };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let detections_column = column![
            text("Preview").size(26),
            preview,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![controls, detections_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_spool_returns_session_to_idle() {
        let (mut viewer, _) = Viewer::boot();
        viewer.session.begin_capture().unwrap();
        let _ = Viewer::update(&mut viewer, Message::Captured(Err("no such file".into())));
        assert_eq!(viewer.session.state(), SessionState::Idle);
        assert!(viewer.session.capture().is_none());
        assert!(viewer.status.contains("no such file"));
    }
}
