//! Reverse-maps a filehandle to a path by walking `..` upwards and
//! scanning each parent directory. Prints the best partial path with a
//! `...` prefix and exits non-zero when the walk could not complete.

use anyhow::Context;
use clap::Parser;

use nfsops_client::tokio::TokioConnector;
use nfsops_client::{MountClient, MountOptions, Nfs3Client, path};
use nfsops_tools::init_logging;
use nfsops_types::nfs3::nfs_fh3;

#[derive(Parser, Debug)]
#[command(name = "nfsops-path-from-fh", version, about = "Resolve a filehandle back to a path")]
struct Args {
    /// Server address
    server: String,

    /// Filehandle to reverse map, as hex
    filehandle: String,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let data = hex::decode(&args.filehandle)
        .with_context(|| format!("cannot parse filehandle {:?}", args.filehandle))?;
    let fh = nfs_fh3::new(data);

    let options = MountOptions {
        reserved_port: true,
        bind_addr: None,
    };
    let mut mount = MountClient::connect_with(TokioConnector, &args.server, options).await?;
    let mut cli = Nfs3Client::connect(TokioConnector, &args.server).await?;

    let resolved = path::path_from_handle(&mut mount, &mut cli, &fh).await?;
    if resolved.complete {
        println!("{}", resolved.path);
        return Ok(());
    }

    tracing::error!("resolve did not succeed");
    if !resolved.path.is_empty() {
        println!("...{}", resolved.path);
    }
    std::process::exit(1);
}
