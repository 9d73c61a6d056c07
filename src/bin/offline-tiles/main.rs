mod args;
mod menu;
mod progress;
mod validators;

use anyhow::{Context, Result};
use std::{net::SocketAddr, process};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use args::{Args, FetchArgs, ServeArgs};
use offline_tiles::{serve, Area, Config, Error, Fetcher, TileSource};
use progress::ProgressReporter;

/// Exit code for a run stopped with Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    init_logging();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let res = match Args::parse() {
        Ok(args) => run(args, cancel).await,
        Err(e) => Err(e),
    };

    // exit explicitly: a prompt may still be blocking on stdin
    match res {
        Ok(()) => process::exit(0),
        Err(e) => match e.downcast_ref::<Error>() {
            Some(Error::Interrupted) => {
                eprintln!("\nDownload interrupted by user");
                process::exit(EXIT_INTERRUPTED);
            }
            Some(Error::Declined { total }) => {
                eprintln!("Download of {} tiles cancelled.", total);
                process::exit(0);
            }
            _ => {
                eprintln!("Error: {:?}", e);
                process::exit(1);
            }
        },
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    match args {
        Args::Fetch(args) => fetch(args, cancel).await,
        Args::Menu(config) => run_menu(config, cancel).await,
        Args::Serve(args) => serve_tiles(args, cancel).await,
    }
}

async fn fetch(args: FetchArgs, cancel: CancellationToken) -> Result<()> {
    if args.dry_run {
        let tile_count = args.area.tile_count() * args.sources.len();

        eprintln!(
            "would download {} tiles (approx {}, assuming 10 kb per tile)",
            tile_count,
            pretty_bytes::converter::convert((tile_count as f64) * 10_000f64)
        );

        return Ok(());
    }

    let assume_yes = args.assume_yes;
    download(args.config, &args.area, &args.sources, cancel, move |total| {
        assume_yes || menu::confirm_large_job(total)
    })
    .await
}

async fn run_menu(config: Config, cancel: CancellationToken) -> Result<()> {
    let selection = tokio::select! {
        _ = cancel.cancelled() => return Err(Error::Interrupted.into()),
        selection = tokio::task::spawn_blocking(menu::select) => selection??,
    };

    let selection = match selection {
        Some(selection) => selection,
        None => {
            eprintln!("Bye.");
            return Ok(());
        }
    };

    println!(
        "\nArea: {} ({} tiles per map type)",
        selection.name,
        selection.area.tile_count()
    );

    download(
        config,
        &selection.area,
        &selection.sources,
        cancel,
        menu::confirm_large_job,
    )
    .await?;

    println!("All tiles downloaded. Run `offline-tiles serve` to browse them.");
    Ok(())
}

async fn download(
    config: Config,
    area: &Area,
    sources: &[TileSource],
    cancel: CancellationToken,
    confirm: impl Fn(usize) -> bool + Send + Sync + 'static,
) -> Result<()> {
    let reporter = ProgressReporter::default();
    let fetcher = Fetcher::new(config)?
        .on_large_job(confirm)
        .on_progress(move |progress| reporter.report(progress))
        .with_cancellation(cancel);

    for (source, summary) in fetcher.fetch_sources(area, sources).await? {
        println!("\nFinished fetching {} tiles:", source);
        println!("  downloaded: {}", summary.downloaded);
        println!("  skipped:    {}", summary.skipped);
        println!("  failed:     {}", summary.failed);
    }

    Ok(())
}

async fn serve_tiles(args: ServeArgs, cancel: CancellationToken) -> Result<()> {
    let addr = SocketAddr::new(args.bind, args.port);

    println!("Serving {} on http://{}", args.root.display(), addr);
    println!("Press Ctrl-C to stop the server.");

    serve::serve(args.root, addr, async move { cancel.cancelled().await })
        .await
        .with_context(|| format!("failed serving on {} (is the port already in use?)", addr))
}
