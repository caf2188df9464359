//! Error types for the two failure planes: RPC-level failures surface as
//! an [`Error`]; a well-formed reply with a non-OK status is returned as
//! a decoded result value, not an error.

use std::error::Error as StdError;
use std::fmt;

use nfsops_types::mount::mountstat3;
use nfsops_types::nfs3::nfsstat3;
use nfsops_types::rpc::auth_stat;

#[derive(Debug)]
pub enum Error {
    /// Transport failure. The connection is torn down and rebuilt on the
    /// next call.
    Io(std::io::Error),
    /// Marshalling failure while encoding a call or decoding a reply.
    Xdr(nfsops_types::xdr::Error),
    /// The server replied, but the RPC layer rejected the exchange.
    Rpc(RpcError),
    /// The per-attempt deadline expired on every try.
    Timeout,
    /// No reserved port below 1024 could be bound.
    PortUnavailable,
    Portmap(PortmapError),
    /// A MOUNT3 procedure failed with the given status.
    Mount(mountstat3),
    /// An NFS3 procedure failed with the given status where only success
    /// was acceptable.
    Nfs(nfsstat3),
    /// A path could not be used for resolution at all.
    InvalidPath(String),
    /// LOOKUP of one component failed while walking a path.
    PathResolution {
        component: String,
        status: nfsstat3,
    },
    /// A cache flush was refused or ended with dirty attributes.
    FlushFailed(nfsstat3),
    /// A cache flush did not complete within the per-file deadline.
    FlushTimedOut,
    /// A cache refresh returned something other than its expected status.
    RefreshFailed(nfsstat3),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Xdr(e) => write!(f, "XDR error: {e}"),
            Self::Rpc(e) => e.fmt(f),
            Self::Timeout => write!(f, "RPC timed out"),
            Self::PortUnavailable => write!(f, "no reserved ports available"),
            Self::Portmap(e) => e.fmt(f),
            Self::Mount(status) => write!(f, "mount failed: {status}"),
            Self::Nfs(status) => write!(f, "call failed: {status}"),
            Self::InvalidPath(path) => write!(f, "invalid path {path:?}"),
            Self::PathResolution { component, status } => {
                write!(f, "cannot resolve component {component:?}: {status}")
            }
            Self::FlushFailed(status) => write!(f, "flush failed: {status}"),
            Self::FlushTimedOut => write!(f, "flush did not complete in time"),
            Self::RefreshFailed(status) => write!(f, "refresh failed: {status}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Xdr(e) => Some(e),
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<nfsops_types::xdr::Error> for Error {
    fn from(e: nfsops_types::xdr::Error) -> Self {
        Self::Xdr(e)
    }
}

impl From<RpcError> for Error {
    fn from(e: RpcError) -> Self {
        Self::Rpc(e)
    }
}

impl From<PortmapError> for Error {
    fn from(e: PortmapError) -> Self {
        Self::Portmap(e)
    }
}

/// Failures of the RPC exchange itself: bad reply framing, XID mismatch,
/// MSG_DENIED, or a non-SUCCESS accept-stat.
#[derive(Debug)]
pub enum RpcError {
    /// The reply's message type was not REPLY.
    UnexpectedMessageType(u32),
    /// The reply's XID did not match the call.
    XidMismatch { expected: u32, got: u32 },
    /// The reply carried bytes past the decoded result.
    TrailingBytes { consumed: u64, total: u64 },
    ProgUnavail,
    ProgMismatch { low: u32, high: u32 },
    ProcUnavail,
    GarbageArgs,
    SystemErr,
    RpcMismatch { low: u32, high: u32 },
    AuthError(auth_stat),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedMessageType(mtype) => {
                write!(f, "message type {mtype} is not REPLY")
            }
            Self::XidMismatch { expected, got } => {
                write!(f, "wrong xid in reply: got {got} expected {expected}")
            }
            Self::TrailingBytes { consumed, total } => {
                write!(f, "reply not fully parsed: {consumed} of {total} bytes")
            }
            Self::ProgUnavail => write!(f, "PROG_UNAVAIL"),
            Self::ProgMismatch { low, high } => {
                write!(f, "PROG_MISMATCH: supported versions {low}..{high}")
            }
            Self::ProcUnavail => write!(f, "PROC_UNAVAIL"),
            Self::GarbageArgs => write!(f, "GARBAGE_ARGS"),
            Self::SystemErr => write!(f, "SYSTEM_ERR"),
            Self::RpcMismatch { low, high } => {
                write!(f, "RPC_MISMATCH: supported versions {low}..{high}")
            }
            Self::AuthError(stat) => write!(f, "AUTH_ERROR: {stat:?}"),
        }
    }
}

impl StdError for RpcError {}

#[derive(Debug)]
pub enum PortmapError {
    /// GETPORT returned 0: the program is not registered.
    ProgramUnavailable,
    InvalidPortValue(u32),
}

impl fmt::Display for PortmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProgramUnavailable => write!(f, "program not registered with portmapper"),
            Self::InvalidPortValue(port) => write!(f, "invalid port value {port}"),
        }
    }
}

impl StdError for PortmapError {}
