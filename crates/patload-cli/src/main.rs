//! Patload - send 93k configuration files to the tester
//!
//! Detects each file's type from its header line, wraps uploads with
//! firmware hook files when present, and expands pattern master files in
//! label-dependency order.

mod config;

use anyhow::Result;
use clap::Parser;
use patload_core::dispatch::Dispatcher;
use patload_core::io::{Transport, TransportError};
use patload_hpt::{HptTransport, SuffixOpener};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "patload")]
#[command(about = "Upload hp93000 configuration files in dependency order")]
#[command(version)]
struct Args {
    /// Configuration file to send
    file: PathBuf,

    /// Path to configuration file
    #[arg(short, long, default_value = "patload.toml")]
    config: PathBuf,

    /// Uploader executable (overrides config)
    #[arg(long)]
    uploader: Option<PathBuf>,

    /// Base directory for master file members (overrides config)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Directory holding .fw.pre/.fw.post hook files (overrides config)
    #[arg(long)]
    hook_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print each file that would be sent, in order, without uploading
    #[arg(long)]
    dry_run: bool,
}

/// Transport that lists what would be sent instead of sending it
struct DryRunTransport;

impl Transport for DryRunTransport {
    fn send(&mut self, path: &Path) -> Result<(), TransportError> {
        println!("{}", path.display());
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Patload v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration and apply command line overrides
    let mut config = config::load_config(&args.config)?;
    if let Some(uploader) = args.uploader {
        config.upload.uploader = uploader;
    }
    if let Some(base_dir) = args.base_dir {
        config.upload.base_dir = base_dir;
    }
    if let Some(hook_dir) = args.hook_dir {
        config.hooks.dir = hook_dir;
    }

    info!(
        uploader = %config.upload.uploader.display(),
        base_dir = %config.upload.base_dir.display(),
        hook_dir = %config.hooks.dir.display(),
        "Configuration loaded"
    );

    let opener = SuffixOpener;

    if args.dry_run {
        let mut transport = DryRunTransport;
        let mut dispatcher = Dispatcher::new(config.to_dispatch_config(), &opener, &mut transport);
        dispatcher.send_file(&args.file)?;
    } else {
        let mut transport = HptTransport::new(&config.upload.uploader);
        let mut dispatcher = Dispatcher::new(config.to_dispatch_config(), &opener, &mut transport);
        dispatcher.send_file(&args.file)?;
    }

    Ok(())
}
