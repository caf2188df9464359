//! Forces a caching filer to recheck objects against its backing
//! filesystem, dropping stale data from the cache.
//!
//! Reads object paths from a list file; each object's type decides
//! whether the READ or the READDIRPLUS refresh form is used.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use nfsops_client::connect;
use nfsops_client::tokio::TokioConnector;
use nfsops_tools::{handle_for_path, init_logging};

#[derive(Parser, Debug)]
#[command(name = "nfsops-refresh", version, about = "Refresh cached objects from the backing filer")]
struct Args {
    /// Export to mount, e.g. /1_1_1_0
    export: String,

    /// Server address
    server: String,

    /// File with one object path per line
    list: PathBuf,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let contents = std::fs::read_to_string(&args.list)
        .with_context(|| format!("reading {}", args.list.display()))?;

    let started = Instant::now();
    tracing::info!(server = %args.server, export = %args.export, "setup");
    let (mut mount, mut cli, root) = connect(TokioConnector, &args.server, &args.export)
        .await
        .context("cannot connect and mount")?;

    let mut failed = 0usize;
    for path in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        tracing::info!(path, "refresh");
        let result = match handle_for_path(&mut cli, &root, path).await {
            Ok(handle) => cli.refresh(&handle).await.map_err(anyhow::Error::from),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::error!(path, %err, "refresh failed");
            failed += 1;
        }
    }

    tracing::info!("cleanup");
    if let Err(err) = mount.umntall().await {
        tracing::debug!(%err, "umntall failed");
    }

    tracing::info!(elapsed = ?started.elapsed(), "done");
    if failed != 0 {
        tracing::error!(failed, "refresh failed for some objects");
        std::process::exit(1);
    }
    Ok(())
}
