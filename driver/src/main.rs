use anyhow::Context;
use clap::Parser;
use mock::model::MockScenario;
use mock::server::{default_bind_address, MockServer, DEFAULT_MAX_UPLOAD_BYTES};
use output::svg::render_svg;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::DriverConfig;
use workflow::runner::Runner;

mod generator;
mod mock;
mod output;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Detect objects in a photo and render the overlay")]
struct Args {
    /// Image to submit for detection
    #[arg(long)]
    image: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Detection endpoint URL
    #[arg(long, env = "DETECTION_URL")]
    endpoint: Option<String>,
    #[arg(long)]
    conf_thres: Option<f32>,
    #[arg(long)]
    iou_thres: Option<f32>,
    #[arg(long)]
    max_retries: Option<u32>,
    /// Width the overlay is rendered at; height follows the image aspect ratio
    #[arg(long)]
    display_width: Option<f32>,
    /// Where the SVG overlay is written
    #[arg(long, default_value = "overlay.svg")]
    output: PathBuf,
    /// Run a mock detection endpoint until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve_mock: bool,
    /// YAML scenario the mock endpoint answers with
    #[arg(long)]
    scenario: Option<PathBuf>,
    #[arg(long, default_value_t = default_bind_address())]
    mock_addr: SocketAddr,
}

impl Args {
    fn driver_config(&self) -> anyhow::Result<DriverConfig> {
        let mut config = match &self.workflow {
            Some(path) => DriverConfig::load(path)?,
            None => DriverConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(value) = self.conf_thres {
            config.confidence_threshold = value;
        }
        if let Some(value) = self.iou_thres {
            config.iou_threshold = value;
        }
        if let Some(value) = self.max_retries {
            config.max_retries = value;
        }
        if let Some(value) = self.display_width {
            config.display_width = value;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    let _mock = if args.serve_mock {
        let scenario = match &args.scenario {
            Some(path) => MockScenario::load(path)?,
            None => MockScenario::default(),
        };
        let server = MockServer::spawn(scenario, args.mock_addr, DEFAULT_MAX_UPLOAD_BYTES)?;
        println!("Mock endpoint ready at {}", server.detect_url());
        Some(server)
    } else {
        None
    };

    if let Some(image) = &args.image {
        let config = args.driver_config()?;
        let runner = Runner::new(config)?;
        let result = runtime.block_on(runner.execute(image))?;

        let svg = render_svg(&result.overlay, Some(&result.source));
        if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&args.output, svg)
            .with_context(|| format!("writing overlay {}", args.output.display()))?;

        println!(
            "{} -> {} predictions ({}x{} shown at {}x{}), attempts {}, overlay {}",
            result.source.display(),
            result.response.predictions.len(),
            result.original_size.0,
            result.original_size.1,
            result.geometry.displayed_width,
            result.geometry.displayed_height,
            result.metrics.attempts,
            args.output.display()
        );
    } else if !args.serve_mock {
        anyhow::bail!("nothing to do: pass --image <path> and/or --serve-mock");
    }

    if args.serve_mock {
        println!("Mock endpoint running (Ctrl+C to stop)...");
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
