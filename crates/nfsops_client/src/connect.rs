use nfsops_types::mount::dirpath;
use nfsops_types::nfs3::nfs_fh3;

use crate::error::Error;
use crate::mount::MountClient;
use crate::net::Connector;
use crate::nfs::Nfs3Client;

/// Connects to a server and mounts `export`.
///
/// Resolves both program ports through the portmapper, mounts the
/// export, and verifies the NFS service with a NULL call. Returns the
/// mount client (kept alive for UMNT/EXPORT use), the NFS client, and
/// the export's root handle.
pub async fn connect<C: Connector + Clone>(
    connector: C,
    host: &str,
    export: &str,
) -> Result<(MountClient<C>, Nfs3Client<C>, nfs_fh3), Error> {
    let mut mount = MountClient::connect(connector.clone(), host).await?;
    let res = mount.mnt(&dirpath::from(export)).await?;

    let mut nfs = Nfs3Client::connect(connector, host).await?;
    nfs.null().await?;

    Ok((mount, nfs, res.fhandle))
}
