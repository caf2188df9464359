//! Credential and verifier builders.
//!
//! Only AUTH_NULL and AUTH_UNIX are supported. The AUTH_UNIX machine
//! name is the host's canonical name so that reverse lookups on the
//! server map back to this client.

use std::time::{SystemTime, UNIX_EPOCH};

use nfsops_types::rpc::{auth_flavor, auth_unix, opaque_auth};
use nfsops_types::xdr::{Opaque, Pack};

use crate::error::Error;

/// RFC 1057 caps the supplementary gid list at 16 entries.
const MAX_GIDS: usize = 16;

/// Which credential a client presents on its calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredFlavor {
    #[default]
    Null,
    Unix,
    /// AUTH_UNIX built from the effective rather than the real ids.
    UnixEuid,
}

impl CredFlavor {
    pub(crate) fn build(self) -> Result<opaque_auth<'static>, Error> {
        match self {
            Self::Null => Ok(null()),
            Self::Unix => unix(),
            Self::UnixEuid => unix_euid(),
        }
    }
}

/// AUTH_NULL: flavor 0, empty body.
pub fn null() -> opaque_auth<'static> {
    opaque_auth::default()
}

/// AUTH_UNIX for the current real user.
pub fn unix() -> Result<opaque_auth<'static>, Error> {
    build_unix(ids::uid(), ids::gid())
}

/// AUTH_UNIX for the current effective user.
pub fn unix_euid() -> Result<opaque_auth<'static>, Error> {
    build_unix(ids::euid(), ids::egid())
}

fn build_unix(uid: u32, gid: u32) -> Result<opaque_auth<'static>, Error> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    let body = auth_unix {
        stamp,
        machinename: Opaque::owned(machine_name().into_bytes()),
        uid,
        gid,
        gids: ids::groups(MAX_GIDS),
    };
    let mut buf = Vec::with_capacity(body.packed_size());
    body.pack(&mut buf)?;
    Ok(opaque_auth {
        flavor: auth_flavor::AUTH_UNIX,
        body: Opaque::owned(buf),
    })
}

/// The canonical host name when resolvable, the bare host name
/// otherwise.
pub fn machine_name() -> String {
    let host = ids::hostname();
    ids::canonical_name(&host).unwrap_or(host)
}

#[cfg(unix)]
mod ids {
    use std::ffi::{CStr, CString};

    pub(super) fn uid() -> u32 {
        unsafe { libc::getuid() }
    }

    pub(super) fn gid() -> u32 {
        unsafe { libc::getgid() }
    }

    pub(super) fn euid() -> u32 {
        unsafe { libc::geteuid() }
    }

    pub(super) fn egid() -> u32 {
        unsafe { libc::getegid() }
    }

    pub(super) fn groups(max: usize) -> Vec<u32> {
        let count = unsafe { libc::getgroups(0, std::ptr::null_mut()) };
        if count <= 0 {
            return Vec::new();
        }
        let mut gids = vec![0 as libc::gid_t; count as usize];
        let filled = unsafe { libc::getgroups(count, gids.as_mut_ptr()) };
        if filled < 0 {
            return Vec::new();
        }
        gids.truncate(filled as usize);
        gids.into_iter().take(max).map(|g| g as u32).collect()
    }

    pub(super) fn hostname() -> String {
        let mut buf = [0u8; 256];
        let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if rc != 0 {
            return "localhost".to_owned();
        }
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        String::from_utf8_lossy(&buf[..end]).into_owned()
    }

    pub(super) fn canonical_name(host: &str) -> Option<String> {
        let c_host = CString::new(host).ok()?;
        let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
        hints.ai_flags = libc::AI_CANONNAME;
        hints.ai_family = libc::AF_UNSPEC;
        hints.ai_socktype = libc::SOCK_STREAM;
        let mut res: *mut libc::addrinfo = std::ptr::null_mut();
        let rc = unsafe { libc::getaddrinfo(c_host.as_ptr(), std::ptr::null(), &hints, &mut res) };
        if rc != 0 || res.is_null() {
            return None;
        }
        let canonical = unsafe {
            let canon = (*res).ai_canonname;
            if canon.is_null() {
                None
            } else {
                Some(CStr::from_ptr(canon).to_string_lossy().into_owned())
            }
        };
        unsafe { libc::freeaddrinfo(res) };
        canonical
    }
}

#[cfg(not(unix))]
mod ids {
    pub(super) fn uid() -> u32 {
        0
    }

    pub(super) fn gid() -> u32 {
        0
    }

    pub(super) fn euid() -> u32 {
        0
    }

    pub(super) fn egid() -> u32 {
        0
    }

    pub(super) fn groups(_max: usize) -> Vec<u32> {
        Vec::new()
    }

    pub(super) fn hostname() -> String {
        std::env::var("COMPUTERNAME")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_else(|_| "localhost".to_owned())
    }

    pub(super) fn canonical_name(_host: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use nfsops_types::rpc::auth_flavor;
    use nfsops_types::xdr::Unpack;

    use super::*;

    #[test]
    fn null_credential_is_empty() {
        let cred = null();
        assert_eq!(cred.flavor, auth_flavor::AUTH_NULL);
        assert!(cred.body.is_empty());
    }

    #[test]
    fn unix_credential_body_decodes() {
        let cred = unix().expect("build credential");
        assert_eq!(cred.flavor, auth_flavor::AUTH_UNIX);

        let mut cursor = std::io::Cursor::new(cred.body.to_vec());
        let (body, read) = auth_unix::unpack(&mut cursor).expect("decode body");
        assert_eq!(read, cred.body.len());
        assert!(body.gids.len() <= MAX_GIDS);
        assert!(!body.machinename.is_empty());
    }
}
