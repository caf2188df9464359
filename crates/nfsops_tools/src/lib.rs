//! Shared plumbing for the command-line tools.

use nfsops_client::Nfs3Client;
use nfsops_client::net::Connector;
use nfsops_types::nfs3::{LOOKUP3args, Nfs3Result, diropargs3, filename3, nfs_fh3};

pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Walks an absolute path (relative to the mounted export root) one
/// LOOKUP at a time.
pub async fn handle_for_path<C: Connector>(
    cli: &mut Nfs3Client<C>,
    root: &nfs_fh3,
    path: &str,
) -> anyhow::Result<nfs_fh3> {
    anyhow::ensure!(path.starts_with('/'), "absolute path needed: {path}");
    let mut handle = root.clone();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        let args = LOOKUP3args {
            what: diropargs3 {
                dir: handle,
                name: filename3::from(component.as_bytes()),
            },
        };
        handle = match cli.lookup(&args).await? {
            Nfs3Result::Ok(ok) => ok.object,
            Nfs3Result::Err((status, _)) => {
                anyhow::bail!("failed to lookup {component} in {path}: {status}")
            }
        };
    }
    Ok(handle)
}
