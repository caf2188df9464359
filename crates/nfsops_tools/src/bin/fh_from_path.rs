//! Prints the NFS filehandle of a path as hex.

use clap::Parser;

use nfsops_client::tokio::TokioConnector;
use nfsops_client::{MountClient, Nfs3Client, path};
use nfsops_tools::init_logging;

#[derive(Parser, Debug)]
#[command(name = "nfsops-fh-from-path", version, about = "Resolve a path to a filehandle")]
struct Args {
    /// Server address
    server: String,

    /// Absolute path to resolve, starting at the / export
    path: String,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut mount = MountClient::connect(TokioConnector, &args.server).await?;
    let mut cli = Nfs3Client::connect(TokioConnector, &args.server).await?;

    let fh = path::resolve_path(&mut mount, &mut cli, &args.path).await?;
    println!("{fh}");
    Ok(())
}
