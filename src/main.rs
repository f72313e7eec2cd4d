use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gas_labeler::annotator::Annotator;
use gas_labeler::mask::{BrushState, DEFAULT_BRUSH_SIZE};
use gas_labeler::script;
use gas_labeler::session::{scan_folder, SessionQueue, SUPPORTED_FORMATS};
use gas_labeler::source::DiskSource;
use gas_labeler::store::DirectoryStore;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Report what is already labeled in a folder and what is left
    Status {
        /// Folder containing the images to label
        folder: PathBuf,
    },

    /// Run a labeling session from an event script
    Replay {
        /// Folder containing the images to label
        folder: PathBuf,

        /// Event script, one event per line
        script: PathBuf,

        /// Initial brush size (1-20)
        #[arg(long, default_value_t = DEFAULT_BRUSH_SIZE)]
        brush_size: u8,

        /// Presentation surface width
        #[arg(long, default_value_t = 1200.0)]
        surface_width: f32,

        /// Presentation surface height
        #[arg(long, default_value_t = 800.0)]
        surface_height: f32,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Gas Labeler starting");

    match args.mode {
        Mode::Status { folder } => status(&folder),
        Mode::Replay {
            folder,
            script,
            brush_size,
            surface_width,
            surface_height,
        } => replay(
            &folder,
            &script,
            BrushState::new(brush_size),
            (surface_width, surface_height),
        ),
    }
}

/// Open the outputs and queue for `folder`, or `None` when it holds no
/// supported images at all
fn open_session(folder: &Path) -> Result<Option<(DirectoryStore, SessionQueue)>> {
    let folder = folder
        .canonicalize()
        .with_context(|| format!("Failed to resolve folder {}", folder.display()))?;
    let folder = folder.as_path();

    if scan_folder(folder)?.is_empty() {
        tracing::warn!(
            "No supported images found in {} (supported formats: {})",
            folder.display(),
            SUPPORTED_FORMATS.join(", ")
        );
        return Ok(None);
    }

    let store = DirectoryStore::beside(folder).context("Failed to prepare output folders")?;
    let queue = SessionQueue::discover(folder, &store)?;
    Ok(Some((store, queue)))
}

fn status(folder: &Path) -> Result<()> {
    let Some((store, queue)) = open_session(folder)? else {
        return Ok(());
    };

    for item in queue.pending() {
        tracing::info!("pending: {}", item.name);
    }
    let progress = queue.progress();
    tracing::info!("Progress        : {}/{}", progress.labeled, queue.total());

    log_summary(&store)
}

fn replay(folder: &Path, script_path: &Path, brush: BrushState, surface: (f32, f32)) -> Result<()> {
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let events = script::parse(&text)
        .with_context(|| format!("Failed to parse script {}", script_path.display()))?;

    let Some((store, queue)) = open_session(folder)? else {
        return Ok(());
    };

    if queue.pending().is_empty() {
        tracing::info!("No unlabeled images found in the selected folder");
        return log_summary(&store);
    }

    tracing::info!(
        "Starting, {} image(s) to label, {} event(s) queued",
        queue.pending().len(),
        events.len()
    );

    let mut annotator = Annotator::new(queue, DiskSource, store, brush, surface);
    let report = script::replay(&mut annotator, &events)?;

    tracing::info!(
        "Replay finished: {} saved, {} skipped, {} failed save(s)",
        report.saved,
        report.skipped,
        report.failed_saves
    );
    let progress = annotator.progress();
    tracing::info!("Progress        : {}/{}", progress.labeled, progress.total);

    log_summary(annotator.store())
}

fn log_summary(store: &DirectoryStore) -> Result<()> {
    let summary = store.summary().context("Failed to count outputs")?;
    tracing::info!("Session summary");
    tracing::info!("  Masks    : {}", summary.masks);
    tracing::info!("  Overlays : {}", summary.overlays);
    tracing::info!("  Location : {}", store.location().display());
    Ok(())
}
