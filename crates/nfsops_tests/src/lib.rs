//! In-memory test harness for the NFS client stack: a duplex channel
//! pair in place of TCP, a connector that hands out scripted
//! connections, and a record-level scripted server.

pub mod io;
pub mod server;

pub use io::{MockChannel, MockConnector, ServerEnd, duplex};
pub use server::{Behavior, Call, pack_value, spawn};

use nfsops_types::nfs3::{
    GETATTR3res, GETATTR3resok, LOOKUP3res, LOOKUP3resok, Nfs3Option, fattr3, ftype3, nfs_fh3,
    nfstime3, nfsstat3, specdata3,
};
use nfsops_types::xdr::Void;

/// A plausible set of file attributes for canned replies.
pub fn sample_fattr(type_: ftype3, fileid: u64) -> fattr3 {
    fattr3 {
        type_,
        mode: 0o755,
        nlink: 1,
        uid: 0,
        gid: 0,
        size: 1024,
        used: 1024,
        rdev: specdata3::default(),
        fsid: 1,
        fileid,
        atime: nfstime3 {
            seconds: 1_700_000_000,
            nseconds: 0,
        },
        mtime: nfstime3 {
            seconds: 1_700_000_000,
            nseconds: 0,
        },
        ctime: nfstime3 {
            seconds: 1_700_000_000,
            nseconds: 0,
        },
    }
}

pub fn handle(bytes: &[u8]) -> nfs_fh3 {
    nfs_fh3::new(bytes.to_vec())
}

/// A successful GETATTR reply body.
pub fn getattr_ok(attrs: fattr3) -> Vec<u8> {
    pack_value(&GETATTR3res::Ok(GETATTR3resok {
        obj_attributes: attrs,
    }))
}

/// A failed GETATTR reply body.
pub fn getattr_err(status: nfsstat3) -> Vec<u8> {
    pack_value(&GETATTR3res::Err((status, Void)))
}

/// A successful LOOKUP reply body resolving to `fh`.
pub fn lookup_ok(fh: nfs_fh3) -> Vec<u8> {
    pack_value(&LOOKUP3res::Ok(LOOKUP3resok {
        object: fh,
        obj_attributes: Nfs3Option::None,
        dir_attributes: Nfs3Option::None,
    }))
}

/// A failed LOOKUP reply body.
pub fn lookup_err(status: nfsstat3) -> Vec<u8> {
    pack_value(&LOOKUP3res::Err((
        status,
        nfsops_types::nfs3::LOOKUP3resfail::default(),
    )))
}

/// A reply body for a void result.
pub fn void_ok() -> Vec<u8> {
    Vec::new()
}
