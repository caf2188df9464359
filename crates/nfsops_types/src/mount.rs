#![allow(
    non_camel_case_types,
    clippy::large_enum_variant,
    clippy::upper_case_acronyms
)]

//! MOUNT version 3 protocol types as defined in RFC 1813 appendix I.

use std::fmt;
use std::io::{Read, Write};

use nfsops_macros::XdrCodec;

use crate::xdr::{Error, List, Opaque, Pack, Result, Unpack};

pub const PROGRAM: u32 = 100_005;
pub const VERSION: u32 = 3;
pub const MNTPATHLEN: usize = 1024;
pub const MNTNAMLEN: usize = 255;
pub const FHSIZE3: usize = 64;

/// FHSIZE3 equals NFS3_FHSIZE, so a mount handle is an NFS handle.
pub type fhandle3 = crate::nfs3::nfs_fh3;

/// MOUNT3 status code. Unknown wire values are preserved verbatim and
/// display with the name `?`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct mountstat3(pub i32);

impl mountstat3 {
    pub const MNT3_OK: Self = Self(0);
    pub const MNT3ERR_PERM: Self = Self(1);
    pub const MNT3ERR_NOENT: Self = Self(2);
    pub const MNT3ERR_IO: Self = Self(5);
    pub const MNT3ERR_ACCES: Self = Self(13);
    pub const MNT3ERR_NOTDIR: Self = Self(20);
    pub const MNT3ERR_INVAL: Self = Self(22);
    pub const MNT3ERR_NAMETOOLONG: Self = Self(63);
    pub const MNT3ERR_NOTSUPP: Self = Self(10004);
    pub const MNT3ERR_SERVERFAULT: Self = Self(10006);

    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "MNT3_OK",
            1 => "MNT3ERR_PERM",
            2 => "MNT3ERR_NOENT",
            5 => "MNT3ERR_IO",
            13 => "MNT3ERR_ACCES",
            20 => "MNT3ERR_NOTDIR",
            22 => "MNT3ERR_INVAL",
            63 => "MNT3ERR_NAMETOOLONG",
            10004 => "MNT3ERR_NOTSUPP",
            10006 => "MNT3ERR_SERVERFAULT",
            _ => "?",
        }
    }

    pub const fn is_err(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for mountstat3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.0, self.name())
    }
}

impl Pack for mountstat3 {
    fn packed_size(&self) -> usize {
        4
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        self.0.pack(out)
    }
}

impl Unpack for mountstat3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (value, read) = i32::unpack(input)?;
        Ok((Self(value), read))
    }
}

/// An export path, at most [`MNTPATHLEN`] bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct dirpath<'a>(pub Opaque<'a>);

impl<'a> From<&'a [u8]> for dirpath<'a> {
    fn from(path: &'a [u8]) -> Self {
        Self(Opaque::borrowed(path))
    }
}

impl<'a> From<&'a str> for dirpath<'a> {
    fn from(path: &'a str) -> Self {
        Self(Opaque::borrowed(path.as_bytes()))
    }
}

impl AsRef<[u8]> for dirpath<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Pack for dirpath<'_> {
    fn packed_size(&self) -> usize {
        self.0.packed_size()
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        if self.0.len() > MNTPATHLEN {
            return Err(Error::TooLong {
                limit: MNTPATHLEN,
                len: self.0.len(),
            });
        }
        self.0.pack(out)
    }
}

impl Unpack for dirpath<'_> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (data, read) = Opaque::unpack(input)?;
        if data.len() > MNTPATHLEN {
            return Err(Error::TooLong {
                limit: MNTPATHLEN,
                len: data.len(),
            });
        }
        Ok((Self(data), read))
    }
}

/// A host or group name, at most [`MNTNAMLEN`] bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct name<'a>(pub Opaque<'a>);

impl<'a> From<&'a [u8]> for name<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self(Opaque::borrowed(data))
    }
}

impl AsRef<[u8]> for name<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Pack for name<'_> {
    fn packed_size(&self) -> usize {
        self.0.packed_size()
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        if self.0.len() > MNTNAMLEN {
            return Err(Error::TooLong {
                limit: MNTNAMLEN,
                len: self.0.len(),
            });
        }
        self.0.pack(out)
    }
}

impl Unpack for name<'_> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (data, read) = Opaque::unpack(input)?;
        if data.len() > MNTNAMLEN {
            return Err(Error::TooLong {
                limit: MNTNAMLEN,
                len: data.len(),
            });
        }
        Ok((Self(data), read))
    }
}

#[derive(Debug, XdrCodec)]
pub struct mountres3_ok {
    pub fhandle: fhandle3,
    pub auth_flavors: Vec<u32>,
}

#[derive(Debug)]
pub enum mountres3 {
    Ok(mountres3_ok),
    Err(mountstat3),
}

impl mountres3 {
    pub const fn status(&self) -> mountstat3 {
        match self {
            Self::Ok(_) => mountstat3::MNT3_OK,
            Self::Err(status) => *status,
        }
    }
}

impl Pack for mountres3 {
    fn packed_size(&self) -> usize {
        match self {
            Self::Ok(ok) => 4 + ok.packed_size(),
            Self::Err(_) => 4,
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::Ok(ok) => mountstat3::MNT3_OK.pack(out)? + ok.pack(out)?,
            Self::Err(status) => status.pack(out)?,
        };
        Ok(written)
    }
}

impl Unpack for mountres3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (status, mut read) = mountstat3::unpack(input)?;
        if status == mountstat3::MNT3_OK {
            let (ok, n) = mountres3_ok::unpack(input)?;
            read += n;
            Ok((Self::Ok(ok), read))
        } else {
            Ok((Self::Err(status), read))
        }
    }
}

#[derive(Debug, XdrCodec)]
pub struct mountbody<'a, 'b> {
    pub ml_hostname: name<'a>,
    pub ml_directory: dirpath<'b>,
}

pub type mountlist<'a, 'b> = List<mountbody<'a, 'b>>;

#[derive(Debug, XdrCodec)]
pub struct export_node<'a, 'b> {
    pub ex_dir: dirpath<'a>,
    pub ex_groups: List<name<'b>>,
}

pub type exports<'a, 'b> = List<export_node<'a, 'b>>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, XdrCodec)]
#[repr(u32)]
pub enum MOUNT_PROGRAM {
    MOUNTPROC3_NULL = 0,
    MOUNTPROC3_MNT = 1,
    MOUNTPROC3_DUMP = 2,
    MOUNTPROC3_UMNT = 3,
    MOUNTPROC3_UMNTALL = 4,
    MOUNTPROC3_EXPORT = 5,
}

impl MOUNT_PROGRAM {
    pub const fn name(self) -> &'static str {
        match self {
            Self::MOUNTPROC3_NULL => "NULL",
            Self::MOUNTPROC3_MNT => "MNT",
            Self::MOUNTPROC3_DUMP => "DUMP",
            Self::MOUNTPROC3_UMNT => "UMNT",
            Self::MOUNTPROC3_UMNTALL => "UMNTALL",
            Self::MOUNTPROC3_EXPORT => "EXPORT",
        }
    }
}
