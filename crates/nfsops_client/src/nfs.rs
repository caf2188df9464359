//! NFSv3 client. Every procedure runs through a retry wrapper that
//! re-issues NFS3ERR_JUKEBOX results under a fresh XID, retries
//! transport failures under the same XID, and feeds the latency tracker.

use std::time::Duration;

use tokio::time::Instant;

use nfsops_types::nfs3::{
    ACCESS3args, ACCESS3res, COMMIT3args, COMMIT3res, CREATE3args, CREATE3res, FSINFO3args,
    FSINFO3res, FSSTAT3args, FSSTAT3res, GETATTR3args, GETATTR3res, LINK3args, LINK3res,
    LOOKUP3args, LOOKUP3res, MKDIR3args, MKDIR3res, MKNOD3args, MKNOD3res, NFS_PROGRAM,
    NfsStatus, PATHCONF3args, PATHCONF3res, PROGRAM, READ3args, READ3res, READDIR3args,
    READDIR3res, READDIRPLUS3args, READDIRPLUS3res, READLINK3args, READLINK3res, REMOVE3args,
    REMOVE3res, RENAME3args, RENAME3res, RMDIR3args, RMDIR3res, SETATTR3args, SETATTR3res,
    SYMLINK3args, SYMLINK3res, VERSION, WRITE3args, WRITE3res, nfsstat3,
};
use nfsops_types::xdr::{Pack, Unpack, Void};

use crate::auth::CredFlavor;
use crate::error::Error;
use crate::net::Connector;
use crate::portmapper::PortmapperClient;
use crate::rpc::{self, CallOptions, Deadline, RpcClient};
use crate::stats::LatencyTracker;

/// Default attempts per NFS call, counting JUKEBOX and transport
/// retries.
pub const DEFAULT_TRIES: u32 = 5;

/// Default per-attempt timeout for NFS calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between retry attempts.
pub const DEFAULT_RETRY_PAUSE: Duration = Duration::from_millis(250);

pub struct Nfs3Client<C: Connector> {
    rpc: RpcClient<C>,
    latencies: LatencyTracker,
    tries: u32,
    timeout: Duration,
    retry_pause: Duration,
}

impl<C: Connector + Clone> Nfs3Client<C> {
    /// Resolves the NFS3 port through the portmapper, then builds a
    /// client for it.
    pub async fn connect(connector: C, host: &str) -> Result<Self, Error> {
        let mut portmapper = PortmapperClient::new(connector.clone(), host);
        let port = portmapper.getport(PROGRAM, VERSION).await?;
        Ok(Self::to_port(connector, host, port))
    }
}

impl<C: Connector> Nfs3Client<C> {
    /// Builds a client for a known port, skipping the portmapper.
    pub fn to_port(connector: C, host: &str, port: u16) -> Self {
        let rpc = RpcClient::new(connector, host, port, PROGRAM, VERSION)
            .with_cred_flavor(CredFlavor::Unix);
        Self {
            rpc,
            latencies: LatencyTracker::new(),
            tries: DEFAULT_TRIES,
            timeout: DEFAULT_TIMEOUT,
            retry_pause: DEFAULT_RETRY_PAUSE,
        }
    }

    pub const fn latencies(&self) -> &LatencyTracker {
        &self.latencies
    }

    pub fn set_tries(&mut self, tries: u32) {
        assert!(tries >= 1, "tries must be at least 1");
        self.tries = tries;
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn set_retry_pause(&mut self, pause: Duration) {
        self.retry_pause = pause;
    }

    pub async fn null(&mut self) -> Result<(), Error> {
        let Void = self.call::<Void, Void>(NFS_PROGRAM::NFSPROC3_NULL, &Void).await?;
        Ok(())
    }

    pub async fn getattr(&mut self, args: &GETATTR3args) -> Result<GETATTR3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_GETATTR, args).await
    }

    pub async fn setattr(&mut self, args: &SETATTR3args) -> Result<SETATTR3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_SETATTR, args).await
    }

    pub async fn lookup(&mut self, args: &LOOKUP3args<'_>) -> Result<LOOKUP3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_LOOKUP, args).await
    }

    pub async fn access(&mut self, args: &ACCESS3args) -> Result<ACCESS3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_ACCESS, args).await
    }

    pub async fn readlink(&mut self, args: &READLINK3args) -> Result<READLINK3res<'static>, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_READLINK, args).await
    }

    pub async fn read(&mut self, args: &READ3args) -> Result<READ3res<'static>, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_READ, args).await
    }

    pub async fn write(&mut self, args: &WRITE3args<'_>) -> Result<WRITE3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_WRITE, args).await
    }

    pub async fn create(&mut self, args: &CREATE3args<'_>) -> Result<CREATE3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_CREATE, args).await
    }

    pub async fn mkdir(&mut self, args: &MKDIR3args<'_>) -> Result<MKDIR3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_MKDIR, args).await
    }

    pub async fn symlink(&mut self, args: &SYMLINK3args<'_>) -> Result<SYMLINK3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_SYMLINK, args).await
    }

    pub async fn mknod(&mut self, args: &MKNOD3args<'_>) -> Result<MKNOD3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_MKNOD, args).await
    }

    pub async fn remove(&mut self, args: &REMOVE3args<'_>) -> Result<REMOVE3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_REMOVE, args).await
    }

    pub async fn rmdir(&mut self, args: &RMDIR3args<'_>) -> Result<RMDIR3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_RMDIR, args).await
    }

    pub async fn rename(&mut self, args: &RENAME3args<'_, '_>) -> Result<RENAME3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_RENAME, args).await
    }

    pub async fn link(&mut self, args: &LINK3args<'_>) -> Result<LINK3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_LINK, args).await
    }

    pub async fn readdir(&mut self, args: &READDIR3args) -> Result<READDIR3res<'static>, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_READDIR, args).await
    }

    pub async fn readdirplus(
        &mut self,
        args: &READDIRPLUS3args,
    ) -> Result<READDIRPLUS3res<'static>, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_READDIRPLUS, args).await
    }

    pub async fn fsstat(&mut self, args: &FSSTAT3args) -> Result<FSSTAT3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_FSSTAT, args).await
    }

    pub async fn fsinfo(&mut self, args: &FSINFO3args) -> Result<FSINFO3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_FSINFO, args).await
    }

    pub async fn pathconf(&mut self, args: &PATHCONF3args) -> Result<PATHCONF3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_PATHCONF, args).await
    }

    pub async fn commit(&mut self, args: &COMMIT3args) -> Result<COMMIT3res, Error> {
        self.call(NFS_PROGRAM::NFSPROC3_COMMIT, args).await
    }

    pub(crate) async fn call<A, R>(&mut self, proc: NFS_PROGRAM, args: &A) -> Result<R, Error>
    where
        A: Pack,
        R: Unpack + NfsStatus,
    {
        let opts = CallOptions {
            deadline: Deadline::Relative(self.timeout),
            tries: self.tries,
            xid: None,
        };
        self.call_with(proc, args, &opts).await
    }

    /// Issues `proc` with explicit options. JUKEBOX results are retried
    /// under a fresh XID unless the caller supplied one; transport
    /// failures are retried under the same XID. The last attempt's
    /// outcome is returned.
    pub async fn call_with<A, R>(
        &mut self,
        proc: NFS_PROGRAM,
        args: &A,
        opts: &CallOptions,
    ) -> Result<R, Error>
    where
        A: Pack,
        R: Unpack + NfsStatus,
    {
        assert!(opts.tries >= 1, "tries must be at least 1");
        let caller_xid = opts.xid;
        let mut xid = caller_xid.unwrap_or_else(rpc::next_xid);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let inner = CallOptions {
                deadline: opts.deadline,
                tries: 1,
                xid: Some(xid),
            };
            let started = Instant::now();
            let result = self.rpc.call::<A, R>(proc as u32, args, &inner).await;
            let elapsed = started.elapsed();

            match result {
                Ok(value) => {
                    let status = value.nfs_status();
                    self.latencies.complete(proc.name(), elapsed, Ok(status));
                    if status == nfsstat3::NFS3ERR_JUKEBOX
                        && attempt < opts.tries
                        && caller_xid.is_none()
                    {
                        let next = rpc::next_xid();
                        tracing::warn!(
                            proc = proc.name(),
                            %status,
                            xid,
                            next_xid = next,
                            attempt,
                            tries = opts.tries,
                            "call jukeboxed, will retry"
                        );
                        xid = next;
                        tokio::time::sleep(self.retry_pause).await;
                        continue;
                    }
                    return Ok(value);
                }
                Err(err) => {
                    self.latencies
                        .complete(proc.name(), elapsed, Err(err.to_string()));
                    if attempt < opts.tries {
                        tracing::warn!(
                            proc = proc.name(),
                            error = %err,
                            xid,
                            attempt,
                            tries = opts.tries,
                            "call failed, will retry"
                        );
                        tokio::time::sleep(self.retry_pause).await;
                        continue;
                    }
                    tracing::warn!(
                        proc = proc.name(),
                        error = %err,
                        xid,
                        attempt,
                        tries = opts.tries,
                        "call failed, will not retry"
                    );
                    return Err(err);
                }
            }
        }
    }
}
