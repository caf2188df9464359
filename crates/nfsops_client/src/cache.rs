//! Cache-special operations.
//!
//! A caching filer reuses COMMIT with reserved offset/count values to
//! flush dirty objects to the backing filesystem, and reserves
//! degenerate READ and READDIRPLUS forms to force an object refresh.

use std::time::Duration;

use tokio::time::Instant;

use nfsops_types::nfs3::{
    COMMIT3args, COMMIT3res, COMMIT3resok, GETATTR3args, Nfs3Result, READ3args, READDIRPLUS3args,
    cookieverf3, fattr3, ftype3, nfs_fh3, nfsstat3,
};

use crate::error::Error;
use crate::net::Connector;
use crate::nfs::Nfs3Client;
use crate::rpc::CallOptions;

/// Offset marking a COMMIT as a cache-flush request.
pub const FLUSH_OFFSET: u64 = 0x1234_ABCD_DEAD_DEAD;

/// COMMIT count selecting a synchronous flush: blocks until the object
/// is clean on the backing filesystem.
pub const SYNC_FLUSH_COUNT: u32 = 0xABAD_BEEF;

/// COMMIT count starting an asynchronous flush. NFS3_OK means already
/// clean, NFS3ERR_NOT_SYNC means the flush was started.
pub const ASYNC_FLUSH_COUNT: u32 = 0xADEA_DBE6;

/// COMMIT count querying flush progress. NFS3_OK means clean,
/// NFS3ERR_NOT_SYNC means still flushing, NFS3ERR_NOTEMPTY means no
/// flush is running but the attributes remain dirty.
pub const FLUSH_STATUS_COUNT: u32 = 0xADEA_DBE5;

/// READDIRPLUS cookie selecting a directory refresh; the server reports
/// NFS3ERR_TOOSMALL once the refresh side effect has been applied.
pub const REFRESH_DIR_COOKIE: u64 = 0xFFFF_FFFF_FFFF_FFFF;

/// Interval between flush-status polls.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Per-attempt deadline for flush COMMIT calls, which can block on the
/// backing filesystem far longer than regular procedures.
pub const FLUSH_CALL_TIMEOUT: Duration = Duration::from_secs(120);

impl<C: Connector> Nfs3Client<C> {
    /// Flushes synchronously: returns once the object is clean, the
    /// server reports an error, or `timeout` expires on every attempt.
    pub async fn sync_flush(
        &mut self,
        file: &nfs_fh3,
        timeout: Duration,
    ) -> Result<COMMIT3res, Error> {
        let args = COMMIT3args {
            file: file.clone(),
            offset: FLUSH_OFFSET,
            count: SYNC_FLUSH_COUNT,
        };
        self.call_with(
            nfsops_types::nfs3::NFS_PROGRAM::NFSPROC3_COMMIT,
            &args,
            &CallOptions::timeout(timeout).with_tries(crate::nfs::DEFAULT_TRIES),
        )
        .await
    }

    /// Starts an asynchronous flush and returns the server's status:
    /// NFS3_OK when already clean, NFS3ERR_NOT_SYNC when started.
    pub async fn start_async_flush(&mut self, file: &nfs_fh3) -> Result<nfsstat3, Error> {
        let args = COMMIT3args {
            file: file.clone(),
            offset: FLUSH_OFFSET,
            count: ASYNC_FLUSH_COUNT,
        };
        let res = self.flush_commit(&args).await?;
        Ok(res.status())
    }

    /// Queries the progress of an asynchronous flush.
    pub async fn check_flush_status(&mut self, file: &nfs_fh3) -> Result<COMMIT3res, Error> {
        let args = COMMIT3args {
            file: file.clone(),
            offset: FLUSH_OFFSET,
            count: FLUSH_STATUS_COUNT,
        };
        self.flush_commit(&args).await
    }

    /// Starts an asynchronous flush and polls its status every
    /// [`STATUS_POLL_INTERVAL`] until the object is clean. `None` as the
    /// per-file timeout means no deadline.
    pub async fn commit_and_wait(
        &mut self,
        file: &nfs_fh3,
        per_file_timeout: Option<Duration>,
    ) -> Result<COMMIT3resok, Error> {
        let status = self.start_async_flush(file).await?;
        if status != nfsstat3::NFS3_OK && status != nfsstat3::NFS3ERR_NOT_SYNC {
            tracing::warn!(handle = %file, %status, "async flush refused");
            return Err(Error::FlushFailed(status));
        }

        let deadline = per_file_timeout.map(|timeout| Instant::now() + timeout);
        loop {
            if let Some(deadline) = deadline {
                if Instant::now() > deadline {
                    tracing::warn!(handle = %file, "flush timed out");
                    return Err(Error::FlushTimedOut);
                }
            }
            match self.check_flush_status(file).await? {
                Nfs3Result::Ok(resok) => {
                    tracing::debug!(handle = %file, "flush completed");
                    return Ok(resok);
                }
                Nfs3Result::Err((nfsstat3::NFS3ERR_NOT_SYNC, _)) => {
                    tracing::debug!(handle = %file, "flush in progress");
                    tokio::time::sleep(STATUS_POLL_INTERVAL).await;
                }
                Nfs3Result::Err((nfsstat3::NFS3ERR_NOTEMPTY, _)) => {
                    tracing::warn!(
                        handle = %file,
                        "no flush in progress but attributes remain dirty"
                    );
                    return Err(Error::FlushFailed(nfsstat3::NFS3ERR_NOTEMPTY));
                }
                Nfs3Result::Err((status, _)) => {
                    tracing::warn!(handle = %file, %status, "flush failed");
                    return Err(Error::FlushFailed(status));
                }
            }
        }
    }

    /// Forces the cache to recheck an object against the backing
    /// filesystem: a degenerate READ for regular files, a reserved
    /// READDIRPLUS for directories. Other types need no refresh.
    pub async fn refresh(&mut self, fh: &nfs_fh3) -> Result<(), Error> {
        let attrs = self.getattr_of(fh).await?;
        match attrs.type_ {
            ftype3::NF3DIR => self.refresh_dir(fh).await,
            ftype3::NF3REG => self.refresh_file(fh).await,
            _ => Ok(()),
        }
    }

    async fn getattr_of(&mut self, fh: &nfs_fh3) -> Result<fattr3, Error> {
        let args = GETATTR3args { object: fh.clone() };
        match self.getattr(&args).await? {
            Nfs3Result::Ok(ok) => Ok(ok.obj_attributes),
            Nfs3Result::Err((status, _)) => Err(Error::Nfs(status)),
        }
    }

    async fn refresh_file(&mut self, fh: &nfs_fh3) -> Result<(), Error> {
        let args = READ3args {
            file: fh.clone(),
            offset: 0,
            count: 0,
        };
        let status = self.read(&args).await?.status();
        if status != nfsstat3::NFS3_OK {
            return Err(Error::RefreshFailed(status));
        }
        Ok(())
    }

    async fn refresh_dir(&mut self, fh: &nfs_fh3) -> Result<(), Error> {
        let args = READDIRPLUS3args {
            dir: fh.clone(),
            cookie: REFRESH_DIR_COOKIE,
            cookieverf: cookieverf3::default(),
            dircount: 0,
            maxcount: 0,
        };
        let status = self.readdirplus(&args).await?.status();
        // TOOSMALL is the success indication for the refresh form.
        if status != nfsstat3::NFS3ERR_TOOSMALL {
            return Err(Error::RefreshFailed(status));
        }
        Ok(())
    }

    async fn flush_commit(&mut self, args: &COMMIT3args) -> Result<COMMIT3res, Error> {
        self.call_with(
            nfsops_types::nfs3::NFS_PROGRAM::NFSPROC3_COMMIT,
            args,
            &CallOptions::timeout(FLUSH_CALL_TIMEOUT).with_tries(crate::nfs::DEFAULT_TRIES),
        )
        .await
    }
}
