use crate::workflow::config::DriverConfig;
use anyhow::Context;
use snapcore::capture::{CaptureDevice, FileCapture};
use snapcore::client::{DetectionClient, HttpTransport};
use snapcore::geometry::DisplayGeometry;
use snapcore::overlay::{DisplayList, OverlayRenderer};
use snapcore::telemetry::Metrics;
use snapcore::DetectionResponse;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct WorkflowResult {
    pub source: PathBuf,
    pub original_size: (u32, u32),
    pub geometry: DisplayGeometry,
    pub response: DetectionResponse,
    pub overlay: DisplayList,
    pub metrics: Metrics,
}

/// Capture, detect, and render one image.
pub struct Runner {
    config: DriverConfig,
    client: DetectionClient<HttpTransport>,
    renderer: OverlayRenderer,
    spool: Spool,
}

enum Spool {
    Configured(PathBuf),
    Scratch(TempDir),
}

impl Spool {
    fn path(&self) -> &Path {
        match self {
            Spool::Configured(path) => path,
            Spool::Scratch(dir) => dir.path(),
        }
    }
}

impl Runner {
    pub fn new(config: DriverConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_timeout(config.endpoint()?, config.request_timeout())
            .context("creating detection transport")?;
        let client = DetectionClient::new(transport).with_retry_delay(config.retry_delay());
        let spool = match &config.spool_dir {
            Some(dir) => Spool::Configured(dir.clone()),
            None => Spool::Scratch(TempDir::new().context("creating capture spool")?),
        };
        Ok(Self {
            config,
            client,
            renderer: OverlayRenderer::default(),
            spool,
        })
    }

    pub async fn execute(&self, source: &Path) -> anyhow::Result<WorkflowResult> {
        let mut device = FileCapture::new(source, self.spool.path());
        let captured = device
            .capture()
            .with_context(|| format!("capturing {}", source.display()))?;
        let original_size = (captured.original_width(), captured.original_height());
        let geometry = DisplayGeometry::fit_width(&captured, self.config.display_width)
            .context("computing display geometry")?;

        let outcome = self
            .client
            .detect(&captured, &self.config.to_detection_params())
            .await;
        if let Err(err) = captured.discard() {
            log::warn!("could not discard spooled capture: {}", err);
        }
        let response = outcome.context("detection failed")?;

        let scale = geometry
            .scale(original_size.0)
            .context("computing display scale")?;

        let mut overlay = DisplayList::new();
        self.renderer.render(
            &mut overlay,
            &response.predictions,
            scale,
            geometry.displayed_width,
            geometry.displayed_height,
        );

        Ok(WorkflowResult {
            source: source.to_path_buf(),
            original_size,
            geometry,
            response,
            overlay,
            metrics: self.client.metrics(),
        })
    }
}
