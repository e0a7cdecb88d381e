use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use dream_canvas_core::{
    analysis, create_surface, render_frame, AnimationDriver, ApiConfig, AppConfig, CanvasConfig,
    DreamFetcher, DreamRecord, FrameClock, FrameContext, FrameExporter, FrameOutcome,
    ManualScheduler, PointerState,
};
use tracing_subscriber::EnvFilter;

fn main() -> dream_canvas_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            base_url,
            token,
            phone,
            output,
        } => run_fetch(base_url.as_deref(), &token, &phone, &output),
        Commands::Analyze { input } => run_analyze(input.as_deref()),
        Commands::Render {
            input,
            output,
            width,
            height,
            time_ms,
            pointer_x,
            pointer_y,
        } => run_render(
            input.as_deref(),
            &output,
            CanvasConfig { width, height },
            time_ms,
            PointerState::new(pointer_x, pointer_y),
        ),
        Commands::Animate {
            input,
            out_dir,
            width,
            height,
            frames,
        } => run_animate(
            input.as_deref(),
            &out_dir,
            CanvasConfig { width, height },
            frames,
        ),
    }
}

fn run_fetch(
    base_url: Option<&str>,
    token: &str,
    phone: &str,
    output: &Path,
) -> dream_canvas_core::Result<()> {
    let api = match base_url {
        Some(url) => ApiConfig {
            base_url: url.to_string(),
        },
        None => {
            let api = AppConfig::default().api;
            tracing::warn!(base_url = %api.base_url, "no --base-url given, using the default");
            api
        }
    };

    let fetcher = DreamFetcher::new(api);
    let runtime = tokio::runtime::Runtime::new()?;
    let dreams = runtime.block_on(fetcher.fetch_recent(token, phone))?;

    tracing::info!(count = dreams.len(), output = %output.display(), "fetched dreams");
    std::fs::write(output, serde_json::to_string_pretty(&dreams)?)?;
    Ok(())
}

fn run_analyze(input: Option<&Path>) -> dream_canvas_core::Result<()> {
    let dreams = load_dreams(input)?;
    let config = analysis::analyze(&dreams);

    tracing::info!(count = dreams.len(), style = %config.style, "analyzed dream snapshot");
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn run_render(
    input: Option<&Path>,
    output: &Path,
    canvas: CanvasConfig,
    time_ms: f64,
    pointer: PointerState,
) -> dream_canvas_core::Result<()> {
    let dreams = load_dreams(input)?;
    let config = analysis::analyze(&dreams);

    let mut surface = create_surface(&canvas)?;
    render_frame(&mut surface, &config, &FrameContext::new(pointer, time_ms));
    dream_canvas_core::save_png(&surface, output)?;

    tracing::info!(style = %config.style, output = %output.display(), "rendered frame");
    Ok(())
}

fn run_animate(
    input: Option<&Path>,
    out_dir: &Path,
    canvas: CanvasConfig,
    frames: u32,
) -> dream_canvas_core::Result<()> {
    let dreams = load_dreams(input)?;
    let config = analysis::analyze(&dreams);
    tracing::info!(style = %config.style, frames, "starting animation loop");

    let mut surface = create_surface(&canvas)?;
    let mut exporter = FrameExporter::new(out_dir)?;
    let mut driver = AnimationDriver::new(ManualScheduler::default());
    let clock = FrameClock::start();

    driver.start(config);
    while exporter.frames_written() < frames && driver.has_pending_frame() {
        // Sweep the pointer across the surface so the proximity response
        // shows up in a headless run.
        let progress = exporter.frames_written() as f32 / frames.max(1) as f32;
        let pointer = PointerState::new(
            progress * canvas.width as f32,
            progress * canvas.height as f32,
        );

        match driver.on_frame(clock.elapsed_ms(), Some(&mut surface), pointer) {
            FrameOutcome::Rendered => {
                exporter.write_frame(&surface)?;
            }
            FrameOutcome::Throttled => std::thread::sleep(Duration::from_millis(4)),
            FrameOutcome::Idle | FrameOutcome::SurfaceLost => break,
        }
    }
    driver.stop();

    tracing::info!(
        frames = exporter.frames_written(),
        out_dir = %out_dir.display(),
        "animation loop finished"
    );
    Ok(())
}

fn load_dreams(input: Option<&Path>) -> dream_canvas_core::Result<Vec<DreamRecord>> {
    match input {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(Vec::new()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generative art from your dream journal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download a sample of dream records from the dream API.
    Fetch {
        /// Base URL of the dream API.
        #[arg(long)]
        base_url: Option<String>,
        /// Bearer token for the authenticated session.
        #[arg(long)]
        token: String,
        /// Phone number the journal is keyed by (with or without `+`).
        #[arg(long)]
        phone: String,
        /// Where to write the fetched records as JSON.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the art configuration derived from a records file.
    Analyze {
        /// Dream records JSON; omit for the empty snapshot.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Paint a single frame and save it as PNG.
    Render {
        /// Dream records JSON; omit for the empty snapshot.
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 960)]
        width: u32,
        #[arg(long, default_value_t = 540)]
        height: u32,
        /// Frame-clock timestamp to render at, in milliseconds.
        #[arg(long, default_value_t = 0.0)]
        time_ms: f64,
        #[arg(long, default_value_t = 0.0)]
        pointer_x: f32,
        #[arg(long, default_value_t = 0.0)]
        pointer_y: f32,
    },
    /// Run the animation loop and export rendered frames.
    Animate {
        /// Dream records JSON; omit for the empty snapshot.
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory for the numbered PNG sequence.
        #[arg(short, long)]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 960)]
        width: u32,
        #[arg(long, default_value_t = 540)]
        height: u32,
        /// How many frames to render before stopping.
        #[arg(long, default_value_t = 90)]
        frames: u32,
    },
}
