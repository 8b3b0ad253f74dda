use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use comic_reader_container::{
    BrowseMode, ContainerOpener, DirectoryTrash, ImageDecoder, ManualClock, RasterDecoder,
    SystemTrash, Trash,
};
use comic_reader_core::{mode_name, CollectionIndex, Reader, ReaderConfig, ReaderStatus};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "comic-reader")]
#[command(about = "Browse comic archives and image folders from the terminal")]
pub struct Cli {
    /// Read settings from this TOML file instead of the default location.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the pages of an archive or folder as JSON.
    Pages {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Print the sibling collection around a path as JSON.
    Collection {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Turn pages one at a time, printing the reader status after each.
    Walk {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(long, default_value_t = 1)]
        steps: usize,
        /// Walk backwards.
        #[arg(long)]
        back: bool,
    },
    /// Replay wheel ticks through the scroll rate limiter.
    Scroll {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Tick times in milliseconds since the first tick.
        #[arg(long, value_delimiter = ',', required = true)]
        ticks_ms: Vec<u64>,
        /// Scroll up instead of down.
        #[arg(long)]
        up: bool,
    },
    /// Move the current archive (or image) to the trash.
    Delete {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Move into this directory instead of the system trash.
        #[arg(long, value_name = "DIR")]
        trash_dir: Option<PathBuf>,
    },
    /// Decode a page and write it as PNG.
    Render {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        output: PathBuf,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct PagesOutput {
    source: String,
    page_count: usize,
    pages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CollectionOutput {
    mode: &'static str,
    current: Option<usize>,
    containers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScrollOutput {
    accepted_ms: Vec<u64>,
    rejected_ms: Vec<u64>,
    status: ReaderStatus,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    deleted: String,
    #[serde(flatten)]
    outcome: comic_reader_core::DeletionOutcome,
    status: ReaderStatus,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);

    if let Commands::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = ReaderConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Pages { path } => run_pages(&config, &path),
        Commands::Collection { path } => run_collection(&config, &path),
        Commands::Walk { path, steps, back } => run_walk(config, &path, steps, back),
        Commands::Scroll { path, ticks_ms, up } => run_scroll(config, &path, &ticks_ms, up),
        Commands::Delete { path, trash_dir } => run_delete(config, &path, trash_dir),
        Commands::Render { path, page, output } => run_render(&config, &path, page, &output),
        Commands::Version => Ok(()),
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .try_init();
}

fn run_pages(config: &ReaderConfig, path: &Path) -> Result<()> {
    ensure_exists(path)?;

    let opener = ContainerOpener::new(config.media_filter());
    let mut container =
        opener.open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let payload = PagesOutput {
        source: container.source().display().to_string(),
        page_count: container.len(),
        pages: container.entries().to_vec(),
    };
    container.close();

    print_json(&payload)
}

fn run_collection(config: &ReaderConfig, path: &Path) -> Result<()> {
    ensure_exists(path)?;

    let opener = ContainerOpener::new(config.media_filter());
    let lister = opener.lister().as_ref();
    let index = if path.is_dir() {
        CollectionIndex::scan(path, BrowseMode::Images, opener.filter(), lister)
    } else {
        let mode = opener.filter().mode_for(path);
        CollectionIndex::build(path, mode, opener.filter(), lister)
    };

    let payload = CollectionOutput {
        mode: mode_name(index.mode()),
        current: index.pointer(),
        containers: index.paths().iter().map(|p| p.display().to_string()).collect(),
    };

    print_json(&payload)
}

fn run_walk(config: ReaderConfig, path: &Path, steps: usize, back: bool) -> Result<()> {
    let mut reader = open_reader(Reader::new(config), path)?;
    show_page(&mut reader)?;

    for _ in 0..steps {
        let moved = if back { reader.prev_page()? } else { reader.next_page()? };
        if !moved {
            println!("end");
            break;
        }
        show_page(&mut reader)?;
    }

    reader.close();
    Ok(())
}

fn show_page(reader: &mut Reader) -> Result<()> {
    match reader.current_page() {
        Ok(page) => println!("{} ({}x{})", reader.status(), page.width, page.height),
        Err(err) => println!("{} (unreadable: {err})", reader.status()),
    }
    reader.run_until_idle();
    Ok(())
}

fn run_scroll(config: ReaderConfig, path: &Path, ticks_ms: &[u64], up: bool) -> Result<()> {
    let clock = ManualClock::new();
    let reader = Reader::new(config).with_clock(Arc::new(clock.clone()));
    let mut reader = open_reader(reader, path)?;

    let wheel_delta = if up { 120 } else { -120 };
    let mut accepted_ms = Vec::new();
    let mut rejected_ms = Vec::new();

    let mut ticks = ticks_ms.to_vec();
    ticks.sort_unstable();
    for ms in ticks {
        clock.set(Duration::from_millis(ms));
        if reader.on_scroll(wheel_delta)? {
            accepted_ms.push(ms);
        } else {
            rejected_ms.push(ms);
        }
    }

    print_json(&ScrollOutput { accepted_ms, rejected_ms, status: reader.status() })
}

fn run_delete(config: ReaderConfig, path: &Path, trash_dir: Option<PathBuf>) -> Result<()> {
    let trash: Arc<dyn Trash> = match trash_dir {
        Some(dir) => Arc::new(DirectoryTrash::new(dir)),
        None => Arc::new(SystemTrash),
    };

    let mut reader = open_reader(Reader::new(config).with_trash(trash), path)?;
    let deleted = match reader.mode() {
        BrowseMode::Archives => reader.collection().current().map(Path::to_path_buf),
        BrowseMode::Images => reader.pages().current_page_path(),
    }
    .unwrap_or_default();

    let outcome = reader.delete_current().context("delete failed")?;

    print_json(&DeleteOutput {
        deleted: deleted.display().to_string(),
        outcome,
        status: reader.status(),
    })
}

fn run_render(config: &ReaderConfig, path: &Path, page: usize, output: &Path) -> Result<()> {
    ensure_exists(path)?;

    if page == 0 {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let opener = ContainerOpener::new(config.media_filter());
    let mut container =
        opener.open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let bytes = container
        .read_index(page - 1)
        .with_context(|| format!("failed to read page {page}"))?;
    let decoded = RasterDecoder.decode(&bytes).context("failed to decode page")?;
    container.close();

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    decoded
        .pixels
        .save_with_format(output, image::ImageFormat::Png)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());
    Ok(())
}

fn open_reader(mut reader: Reader, path: &Path) -> Result<Reader> {
    ensure_exists(path)?;
    reader.open_path(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(reader)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("path does not exist: {}", path.display());
    }

    Ok(())
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    println!("{json}");
    Ok(())
}
