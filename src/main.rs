//! mediadrop - Entry Point
//!
//! Runs either end of a one-sender/one-receiver media transfer over raw TCP.
//! The transfer itself always happens on a worker thread; the main thread
//! only observes progress.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use mediadrop::receiver::DestinationNamer;
use mediadrop::sender::list_media_files;
use mediadrop::utils::logging::setup_logging;
use mediadrop::{
    AppConfig, BatchRunner, FileSink, ProgressEvent, ProgressFeed, ProgressSink, ProgressState,
    SelectionQueue, TransferClient, TransferListener,
};

#[derive(Parser)]
#[command(name = "mediadrop", version, about = "Send media files to a fixed receiver over TCP")]
struct Cli {
    /// Configuration file (defaults to ./mediadrop.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Receive files into the destination directory until the process is killed
    Receive,
    /// Send files from the source directory, in the order given
    Send {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List the media files available in the source directory
    List,
}

fn main() {
    setup_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Receive => receive(&config),
        Command::Send { names } => send(&config, names),
        Command::List => list(&config),
    }
}

fn receive(config: &AppConfig) -> Result<()> {
    let destination = config.destination_dir();
    if let Err(e) = fs::create_dir_all(&destination) {
        warn!(
            "Failed to create destination directory {}: {}",
            destination.display(),
            e
        );
    }

    let (progress, feed) = ProgressSink::channel();
    let namer = DestinationNamer::resume(
        &destination,
        &config.receiver.file_prefix,
        &config.receiver.file_extension,
    )?;
    let sink = FileSink::new(namer, config.chunk_size, progress.clone())
        .with_idle_timeout(config.idle_timeout());
    let listener = TransferListener::bind(config.bind_socket()?, sink, progress)?;

    let worker = listener.spawn().context("Failed to start receiver thread")?;
    observe(&feed);

    match worker.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e).context("Receiver stopped"),
        Err(_) => bail!("Receiver thread panicked"),
    }
}

fn send(config: &AppConfig, names: Vec<String>) -> Result<()> {
    let (progress, feed) = ProgressSink::channel();
    let client = TransferClient::new(
        config.source_dir(),
        config.receiver_socket()?,
        config.chunk_size,
        progress.clone(),
    )
    .with_connect_timeout(config.connect_timeout())
    .with_idle_timeout(config.idle_timeout());

    let queue = SelectionQueue::new();
    for name in names {
        queue.append(name);
    }
    println!("Selected Files: {queue}");

    let runner = Arc::new(BatchRunner::new(client, queue, progress));
    let worker = runner.spawn()?;
    // The worker holds the last sink; the feed ends when it finishes.
    drop(runner);
    observe(&feed);

    let report = worker
        .join()
        .map_err(|_| anyhow!("Sender thread panicked"))?;

    if !report.failed.is_empty() {
        bail!(
            "{} of {} files failed: {}",
            report.failed.len(),
            report.total(),
            report.failed.join(", ")
        );
    }
    Ok(())
}

fn list(config: &AppConfig) -> Result<()> {
    let source = config.source_dir();
    let names = list_media_files(&source, &config.sender.media_extensions)
        .with_context(|| format!("Failed to list {}", source.display()))?;

    if names.is_empty() {
        println!("No media files in {}", source.display());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

/// Drains the feed until every sink is gone, printing what an operator
/// would see.
fn observe(feed: &ProgressFeed) {
    let mut state = ProgressState::new();
    let mut last_percent = None;

    while let Some(event) = feed.recv() {
        if !state.apply(&event) {
            continue;
        }
        match &event {
            ProgressEvent::Status(status) if status.is_failure() => eprintln!("{status}"),
            ProgressEvent::Status(status) => println!("{status}"),
            ProgressEvent::Fraction(_) => {
                let label = state.percent_label();
                if last_percent.as_ref() != Some(&label) {
                    println!("{label}");
                    last_percent = Some(label);
                }
            }
            ProgressEvent::Bytes(_) => debug!("{}", state.bytes_label()),
            ProgressEvent::Reset => last_percent = None,
            ProgressEvent::FileReceived(path) => {
                info!("Received {}", path.display());
                println!("Received Files:\n{}", state.received_summary());
            }
        }
    }
}
