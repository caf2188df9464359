//! Flushes dirty files on a caching filer to its backing filesystem.
//!
//! Reads newline-separated absolute paths from standard input and
//! dispatches flushes across a pool of workers, each with its own
//! client pair. Exits non-zero when any file failed to flush.

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use nfsops_client::tokio::TokioConnector;
use nfsops_client::{Nfs3Client, connect};
use nfsops_types::nfs3::{Nfs3Option, nfs_fh3};
use nfsops_tools::{handle_for_path, init_logging};

#[derive(Parser, Debug)]
#[command(name = "nfsops-flush", version, about = "Flush dirty files to the backing filer")]
struct Args {
    /// Export to mount, e.g. /1_1_1_0
    export: String,

    /// Server address
    server: String,

    /// Number of concurrent flush workers
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Per-file flush timeout in seconds; 0 waits forever
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Flush each file synchronously instead of start-then-poll
    #[arg(long)]
    sync: bool,

    /// Log every flush-in-progress check
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let queue: VecDeque<String> = std::io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .context("reading paths from stdin")?
        .into_iter()
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect();

    let queue = Arc::new(Mutex::new(queue));
    let errors = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    let mut workers = Vec::new();
    for worker_id in 0..args.threads.max(1) {
        let queue = Arc::clone(&queue);
        let errors = Arc::clone(&errors);
        let server = args.server.clone();
        let export = args.export.clone();
        let timeout = args.timeout;
        let sync = args.sync;
        workers.push(tokio::spawn(async move {
            worker(worker_id, &server, &export, timeout, sync, &queue, &errors).await;
        }));
    }
    for worker in workers {
        worker.await.context("flush worker panicked")?;
    }

    tracing::info!(elapsed = ?started.elapsed(), "all files processed");
    let errors = errors.load(Ordering::SeqCst);
    if errors != 0 {
        tracing::error!(errors, "errors encountered, grep ERROR output for details");
        std::process::exit(1);
    }
    Ok(())
}

async fn worker(
    worker_id: usize,
    server: &str,
    export: &str,
    timeout: u64,
    sync: bool,
    queue: &Mutex<VecDeque<String>>,
    errors: &AtomicUsize,
) {
    let (mut mount, mut cli, root) = match connect(TokioConnector, server, export).await {
        Ok(connected) => connected,
        Err(err) => {
            tracing::error!(worker_id, %err, "cannot connect and mount");
            errors.fetch_add(1, Ordering::SeqCst);
            return;
        }
    };

    loop {
        let next = queue.lock().expect("path queue poisoned").pop_front();
        let Some(path) = next else { break };
        if !flush_one(&mut cli, &root, &path, worker_id, timeout, sync).await {
            errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    if let Err(err) = mount.umntall().await {
        tracing::debug!(worker_id, %err, "umntall failed");
    }
}

async fn flush_one(
    cli: &mut Nfs3Client<TokioConnector>,
    root: &nfs_fh3,
    path: &str,
    worker_id: usize,
    timeout: u64,
    sync: bool,
) -> bool {
    let handle = match handle_for_path(cli, root, path).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(worker_id, path, %err, "ERROR failed lookup");
            return false;
        }
    };

    let started = Instant::now();
    tracing::info!(worker_id, path, handle = %handle, "flushing");

    let result = if sync {
        let per_call = if timeout == 0 {
            nfsops_client::cache::FLUSH_CALL_TIMEOUT
        } else {
            Duration::from_secs(timeout)
        };
        cli.sync_flush(&handle, per_call)
            .await
            .and_then(|res| match res {
                nfsops_types::nfs3::Nfs3Result::Ok(ok) => Ok(ok),
                nfsops_types::nfs3::Nfs3Result::Err((status, _)) => {
                    Err(nfsops_client::Error::FlushFailed(status))
                }
            })
    } else {
        let deadline = (timeout != 0).then(|| Duration::from_secs(timeout));
        cli.commit_and_wait(&handle, deadline).await
    };

    match result {
        Ok(resok) => {
            let mtime = match resok.file_wcc.after {
                Nfs3Option::Some(attrs) => Some(attrs.mtime),
                Nfs3Option::None => None,
            };
            tracing::info!(
                worker_id,
                path,
                elapsed = ?started.elapsed(),
                mtime = ?mtime,
                "flushed"
            );
            true
        }
        Err(err) => {
            tracing::error!(
                worker_id,
                path,
                elapsed = ?started.elapsed(),
                %err,
                "ERROR flushing"
            );
            false
        }
    }
}
