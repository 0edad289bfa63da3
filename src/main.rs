//! `planview`: headless host for the viewport engine.
//!
//! Fetches a drawing (HTTP against the conversion backend, or a local file),
//! loads it into an engine, replays scripted interactions on a simulated
//! clock, and writes or prints the result.

mod config;
mod error;
mod fetch;
mod session;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use viewport::metadata::LayerRecord;
use viewport::surface::Viewport;
use viewport::{DrawingPayload, Engine, EngineConfig, SurfaceKind, SurfaceOutput};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::fetch::Source;
use crate::session::{Session, Step};

#[derive(Parser, Debug)]
#[command(name = "planview", about = "Render and inspect vector floor plans")]
struct Cli {
    /// Backend that relative drawing paths resolve against.
    #[arg(long, env = "PLANVIEW_BASE_URL")]
    base_url: Option<String>,

    /// Drawing surface: `live` (vector markup) or `raster` (PNG).
    #[arg(long, env = "PLANVIEW_SURFACE")]
    surface: Option<SurfaceKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DrawingArgs {
    /// URL, backend path, or local file of the drawing.
    source: String,

    /// JSON layer table from the conversion service; overrides any embedded table.
    #[arg(long)]
    layer_table: Option<PathBuf>,

    /// Container width in CSS pixels.
    #[arg(long, default_value_t = 1000.0)]
    width: f64,

    /// Container height in CSS pixels.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Interaction to replay, in order (`zoom=2`, `pan=10,0`, `hide=RM_WALL`, ...).
    #[arg(long = "step", value_name = "STEP")]
    steps: Vec<Step>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the steps and write the final frame (SVG for live, PNG for raster).
    Render {
        #[command(flatten)]
        drawing: DrawingArgs,
        #[arg(long, short)]
        out: PathBuf,
    },
    /// Print the layer registry as JSON.
    Layers {
        #[command(flatten)]
        drawing: DrawingArgs,
    },
    /// Print the embedded metadata as JSON.
    Metadata {
        #[command(flatten)]
        drawing: DrawingArgs,
    },
    /// Apply the steps, click at a screen point, and print the readout.
    Inspect {
        #[command(flatten)]
        drawing: DrawingArgs,
        x: f64,
        y: f64,
    },
}

#[tokio::main]
async fn main() {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("warning: ignoring .env: {e}"),
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!(error = %e, "planview failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), HostError> {
    let config = HostConfig::from_env()?.with_overrides(cli.base_url.as_deref(), cli.surface);
    match cli.command {
        Command::Render { drawing, out } => {
            let session = prepare(&config, &drawing).await?;
            write_output(&session, &out).await
        }
        Command::Layers { drawing } => {
            let session = prepare(&config, &drawing).await?;
            println!("{}", serde_json::to_string_pretty(session.engine().layers())?);
            Ok(())
        }
        Command::Metadata { drawing } => {
            let session = prepare(&config, &drawing).await?;
            println!("{}", serde_json::to_string_pretty(&session.engine().metadata().to_json())?);
            Ok(())
        }
        Command::Inspect { drawing, x, y } => {
            let mut session = prepare(&config, &drawing).await?;
            session.apply(&Step::Click(viewport::camera::Point::new(x, y)))?;
            session.settle()?;
            match session.last_readout() {
                Some(readout) => println!("{readout}"),
                None => println!("no readout (drawing not loaded)"),
            }
            Ok(())
        }
    }
}

/// Fetch, load, replay steps, and settle.
async fn prepare(config: &HostConfig, drawing: &DrawingArgs) -> Result<Session, HostError> {
    let client = fetch::build_client(config)?;
    let source = fetch::resolve(&config.base_url, &drawing.source, Path::exists);
    let layer_table = match &drawing.layer_table {
        Some(path) => Some(read_layer_table(&client, path).await?),
        None => None,
    };

    let mut engine = Engine::for_kind(config.surface, EngineConfig::default());
    let viewport = Viewport { width: drawing.width, height: drawing.height, dpr: drawing.dpr };
    engine.set_viewport(viewport, std::time::Duration::ZERO);
    let mut session = Session::new(engine);

    let result = fetch::fetch_text(&client, &source)
        .await
        .map(|markup| DrawingPayload { markup, layer_table });
    session.load(result)?;
    session.settle()?;
    for step in &drawing.steps {
        session.apply(step)?;
        session.settle()?;
    }
    tracing::info!(
        source = ?source,
        surface = %config.surface,
        scale = session.engine().transform().scale,
        "drawing ready"
    );
    Ok(session)
}

async fn read_layer_table(client: &reqwest::Client, path: &Path) -> Result<Vec<LayerRecord>, HostError> {
    let text = fetch::fetch_text(client, &Source::File(path.to_path_buf())).await?;
    Ok(serde_json::from_str(&text)?)
}

async fn write_output(session: &Session, out: &Path) -> Result<(), HostError> {
    let bytes = match session.engine().output() {
        SurfaceOutput::Empty => return Err(HostError::NothingRendered),
        SurfaceOutput::Markup(markup) => markup.into_bytes(),
        SurfaceOutput::Pixels(pixmap) => pixmap.encode_png().map_err(|e| HostError::Png(e.to_string()))?,
    };
    tokio::fs::write(out, &bytes)
        .await
        .map_err(|source| HostError::Write { path: out.display().to_string(), source })?;
    tracing::info!(path = %out.display(), bytes = bytes.len(), "wrote frame");
    Ok(())
}
