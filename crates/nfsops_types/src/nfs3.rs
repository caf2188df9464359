#![allow(
    non_camel_case_types,
    clippy::large_enum_variant,
    clippy::upper_case_acronyms
)]

//! NFS version 3 protocol types as defined in RFC 1813.
//!
//! Naming mirrors the RFC. The resok/resfail unions are expressed through
//! [`Nfs3Result`]; only the arm selected by the leading status exists in a
//! decoded value.

use std::fmt;
use std::io::{Read, Write};

use nfsops_macros::XdrCodec;

use crate::xdr::{
    Error, List, Opaque, Pack, Result, Unpack, Void, pack_fixed_opaque, unpack_fixed_opaque,
};

pub const PROGRAM: u32 = 100_003;
pub const VERSION: u32 = 3;

pub const NFS3_FHSIZE: usize = 64;
pub const NFS3_COOKIEVERFSIZE: usize = 8;
pub const NFS3_CREATEVERFSIZE: usize = 8;
pub const NFS3_WRITEVERFSIZE: usize = 8;

pub const ACCESS3_READ: u32 = 0x0001;
pub const ACCESS3_LOOKUP: u32 = 0x0002;
pub const ACCESS3_MODIFY: u32 = 0x0004;
pub const ACCESS3_EXTEND: u32 = 0x0008;
pub const ACCESS3_DELETE: u32 = 0x0010;
pub const ACCESS3_EXECUTE: u32 = 0x0020;

pub const FSF3_LINK: u32 = 0x0001;
pub const FSF3_SYMLINK: u32 = 0x0002;
pub const FSF3_HOMOGENEOUS: u32 = 0x0008;
pub const FSF3_CANSETTIME: u32 = 0x0010;

pub type cookie3 = u64;
pub type count3 = u32;
pub type fileid3 = u64;
pub type gid3 = u32;
pub type mode3 = u32;
pub type offset3 = u64;
pub type size3 = u64;
pub type uid3 = u32;

/// NFSv3 status code.
///
/// The wire may carry values outside RFC 1813 (vendor extensions); they
/// are preserved verbatim and display with the name `?`. The type is
/// deliberately not ordered.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct nfsstat3(pub i32);

impl nfsstat3 {
    pub const NFS3_OK: Self = Self(0);
    pub const NFS3ERR_PERM: Self = Self(1);
    pub const NFS3ERR_NOENT: Self = Self(2);
    pub const NFS3ERR_IO: Self = Self(5);
    pub const NFS3ERR_NXIO: Self = Self(6);
    pub const NFS3ERR_ACCES: Self = Self(13);
    pub const NFS3ERR_EXIST: Self = Self(17);
    pub const NFS3ERR_XDEV: Self = Self(18);
    pub const NFS3ERR_NODEV: Self = Self(19);
    pub const NFS3ERR_NOTDIR: Self = Self(20);
    pub const NFS3ERR_ISDIR: Self = Self(21);
    pub const NFS3ERR_INVAL: Self = Self(22);
    pub const NFS3ERR_FBIG: Self = Self(27);
    pub const NFS3ERR_NOSPC: Self = Self(28);
    pub const NFS3ERR_ROFS: Self = Self(30);
    pub const NFS3ERR_MLINK: Self = Self(31);
    pub const NFS3ERR_NAMETOOLONG: Self = Self(63);
    pub const NFS3ERR_NOTEMPTY: Self = Self(66);
    pub const NFS3ERR_DQUOT: Self = Self(69);
    pub const NFS3ERR_STALE: Self = Self(70);
    pub const NFS3ERR_REMOTE: Self = Self(71);
    pub const NFS3ERR_BADHANDLE: Self = Self(10001);
    pub const NFS3ERR_NOT_SYNC: Self = Self(10002);
    pub const NFS3ERR_BAD_COOKIE: Self = Self(10003);
    pub const NFS3ERR_NOTSUPP: Self = Self(10004);
    pub const NFS3ERR_TOOSMALL: Self = Self(10005);
    pub const NFS3ERR_SERVERFAULT: Self = Self(10006);
    pub const NFS3ERR_BADTYPE: Self = Self(10007);
    pub const NFS3ERR_JUKEBOX: Self = Self(10008);

    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "NFS3_OK",
            1 => "NFS3ERR_PERM",
            2 => "NFS3ERR_NOENT",
            5 => "NFS3ERR_IO",
            6 => "NFS3ERR_NXIO",
            13 => "NFS3ERR_ACCES",
            17 => "NFS3ERR_EXIST",
            18 => "NFS3ERR_XDEV",
            19 => "NFS3ERR_NODEV",
            20 => "NFS3ERR_NOTDIR",
            21 => "NFS3ERR_ISDIR",
            22 => "NFS3ERR_INVAL",
            27 => "NFS3ERR_FBIG",
            28 => "NFS3ERR_NOSPC",
            30 => "NFS3ERR_ROFS",
            31 => "NFS3ERR_MLINK",
            63 => "NFS3ERR_NAMETOOLONG",
            66 => "NFS3ERR_NOTEMPTY",
            69 => "NFS3ERR_DQUOT",
            70 => "NFS3ERR_STALE",
            71 => "NFS3ERR_REMOTE",
            10001 => "NFS3ERR_BADHANDLE",
            10002 => "NFS3ERR_NOT_SYNC",
            10003 => "NFS3ERR_BAD_COOKIE",
            10004 => "NFS3ERR_NOTSUPP",
            10005 => "NFS3ERR_TOOSMALL",
            10006 => "NFS3ERR_SERVERFAULT",
            10007 => "NFS3ERR_BADTYPE",
            10008 => "NFS3ERR_JUKEBOX",
            _ => "?",
        }
    }

    pub const fn is_err(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for nfsstat3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.0, self.name())
    }
}

impl Pack for nfsstat3 {
    fn packed_size(&self) -> usize {
        4
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        self.0.pack(out)
    }
}

impl Unpack for nfsstat3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (value, read) = i32::unpack(input)?;
        Ok((Self(value), read))
    }
}

/// Anything that carries an NFSv3 status: every result envelope, plus
/// [`Void`] for the NULL procedure (whose success is synthesized).
pub trait NfsStatus {
    fn nfs_status(&self) -> nfsstat3;
}

impl NfsStatus for Void {
    fn nfs_status(&self) -> nfsstat3 {
        nfsstat3::NFS3_OK
    }
}

/// A resok/resfail union. The leading status word selects which arm
/// follows on the wire; the failure arm usually still carries attribute
/// data (`wcc_data` or `post_op_attr`).
#[derive(Debug)]
pub enum Nfs3Result<T, E> {
    Ok(T),
    Err((nfsstat3, E)),
}

impl<T, E> Nfs3Result<T, E> {
    pub const fn status(&self) -> nfsstat3 {
        match self {
            Self::Ok(_) => nfsstat3::NFS3_OK,
            Self::Err((status, _)) => *status,
        }
    }

    pub fn into_ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Err(_) => None,
        }
    }
}

impl<T, E> NfsStatus for Nfs3Result<T, E> {
    fn nfs_status(&self) -> nfsstat3 {
        self.status()
    }
}

impl<T: Pack, E: Pack> Pack for Nfs3Result<T, E> {
    fn packed_size(&self) -> usize {
        4 + match self {
            Self::Ok(value) => value.packed_size(),
            Self::Err((_, err)) => err.packed_size(),
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::Ok(value) => nfsstat3::NFS3_OK.pack(out)? + value.pack(out)?,
            Self::Err((status, err)) => status.pack(out)? + err.pack(out)?,
        };
        Ok(written)
    }
}

impl<T: Unpack, E: Unpack> Unpack for Nfs3Result<T, E> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (status, mut read) = nfsstat3::unpack(input)?;
        if status == nfsstat3::NFS3_OK {
            let (value, n) = T::unpack(input)?;
            read += n;
            Ok((Self::Ok(value), read))
        } else {
            let (err, n) = E::unpack(input)?;
            read += n;
            Ok((Self::Err((status, err)), read))
        }
    }
}

/// A bool-discriminated optional value (`post_op_attr` and friends).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Nfs3Option<T> {
    Some(T),
    #[default]
    None,
}

impl<T> Nfs3Option<T> {
    pub const fn is_some(&self) -> bool {
        matches!(self, Self::Some(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Self::Some(value) => Some(value),
            Self::None => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Some(value) => Some(value),
            Self::None => None,
        }
    }
}

impl<T: PartialEq> PartialEq<T> for Nfs3Option<T> {
    fn eq(&self, other: &T) -> bool {
        match self {
            Self::Some(value) => value == other,
            Self::None => false,
        }
    }
}

impl<T: Pack> Pack for Nfs3Option<T> {
    fn packed_size(&self) -> usize {
        4 + match self {
            Self::Some(value) => value.packed_size(),
            Self::None => 0,
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::Some(value) => true.pack(out)? + value.pack(out)?,
            Self::None => false.pack(out)?,
        };
        Ok(written)
    }
}

impl<T: Unpack> Unpack for Nfs3Option<T> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (present, mut read) = bool::unpack(input)?;
        if present {
            let (value, n) = T::unpack(input)?;
            read += n;
            Ok((Self::Some(value), read))
        } else {
            Ok((Self::None, read))
        }
    }
}

pub type post_op_attr = Nfs3Option<fattr3>;
pub type post_op_fh3 = Nfs3Option<nfs_fh3>;
pub type pre_op_attr = Nfs3Option<wcc_attr>;
pub type sattrguard3 = Nfs3Option<nfstime3>;
pub type set_gid3 = Nfs3Option<gid3>;
pub type set_mode3 = Nfs3Option<mode3>;
pub type set_size3 = Nfs3Option<size3>;
pub type set_uid3 = Nfs3Option<uid3>;

/// An opaque filehandle of at most [`NFS3_FHSIZE`] bytes. Handles are
/// compared and ordered by their raw bytes.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct nfs_fh3 {
    pub data: Opaque<'static>,
}

impl nfs_fh3 {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Opaque::owned(data),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for nfs_fh3 {
    fn default() -> Self {
        Self {
            data: Opaque::borrowed(&[]),
        }
    }
}

impl From<Vec<u8>> for nfs_fh3 {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl fmt::Display for nfs_fh3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.data.as_ref() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Pack for nfs_fh3 {
    fn packed_size(&self) -> usize {
        self.data.packed_size()
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        if self.data.len() > NFS3_FHSIZE {
            return Err(Error::TooLong {
                limit: NFS3_FHSIZE,
                len: self.data.len(),
            });
        }
        self.data.pack(out)
    }
}

impl Unpack for nfs_fh3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (data, read) = Opaque::unpack(input)?;
        if data.len() > NFS3_FHSIZE {
            return Err(Error::TooLong {
                limit: NFS3_FHSIZE,
                len: data.len(),
            });
        }
        Ok((Self { data }, read))
    }
}

/// A component name, raw bytes preserved verbatim.
#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct filename3<'a>(pub Opaque<'a>);

impl From<Vec<u8>> for filename3<'static> {
    fn from(name: Vec<u8>) -> Self {
        Self(Opaque::owned(name))
    }
}

impl<'a> From<&'a [u8]> for filename3<'a> {
    fn from(name: &'a [u8]) -> Self {
        Self(Opaque::borrowed(name))
    }
}

impl AsRef<[u8]> for filename3<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl filename3<'_> {
    pub fn clone_to_owned(&self) -> filename3<'static> {
        self.0.to_vec().into()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq<[u8]> for filename3<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.as_ref() == other
    }
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct nfspath3<'a>(pub Opaque<'a>);

impl From<Vec<u8>> for nfspath3<'static> {
    fn from(path: Vec<u8>) -> Self {
        Self(Opaque::owned(path))
    }
}

impl<'a> From<&'a [u8]> for nfspath3<'a> {
    fn from(path: &'a [u8]) -> Self {
        Self(Opaque::borrowed(path))
    }
}

impl AsRef<[u8]> for nfspath3<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl nfspath3<'_> {
    pub fn clone_to_owned(&self) -> nfspath3<'static> {
        self.0.to_vec().into()
    }
}

impl PartialEq<[u8]> for nfspath3<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.as_ref() == other
    }
}

/// Seconds and nanoseconds since the epoch. Orders by the instant it
/// denotes.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, PartialOrd, Ord, XdrCodec)]
pub struct nfstime3 {
    pub seconds: u32,
    pub nseconds: u32,
}

impl TryFrom<std::time::SystemTime> for nfstime3 {
    type Error = std::time::SystemTimeError;

    fn try_from(time: std::time::SystemTime) -> std::result::Result<Self, Self::Error> {
        time.duration_since(std::time::UNIX_EPOCH)
            .map(|duration| Self {
                seconds: u32::try_from(duration.as_secs()).unwrap_or(u32::MAX),
                nseconds: duration.subsec_nanos(),
            })
    }
}

#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, XdrCodec)]
pub struct specdata3 {
    pub specdata1: u32,
    pub specdata2: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, XdrCodec)]
#[repr(u32)]
pub enum ftype3 {
    NF3REG = 1,
    NF3DIR = 2,
    NF3BLK = 3,
    NF3CHR = 4,
    NF3LNK = 5,
    NF3SOCK = 6,
    NF3FIFO = 7,
}

#[derive(Debug, Clone, XdrCodec)]
pub struct fattr3 {
    pub type_: ftype3,
    pub mode: mode3,
    pub nlink: u32,
    pub uid: uid3,
    pub gid: gid3,
    pub size: size3,
    pub used: size3,
    pub rdev: specdata3,
    pub fsid: u64,
    pub fileid: fileid3,
    pub atime: nfstime3,
    pub mtime: nfstime3,
    pub ctime: nfstime3,
}

#[derive(Debug, Clone, XdrCodec)]
pub struct wcc_attr {
    pub size: size3,
    pub mtime: nfstime3,
    pub ctime: nfstime3,
}

#[derive(Debug, Clone, Default, XdrCodec)]
pub struct wcc_data {
    pub before: pre_op_attr,
    pub after: post_op_attr,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, XdrCodec)]
#[repr(u32)]
pub enum time_how {
    DONT_CHANGE = 0,
    SET_TO_SERVER_TIME = 1,
    SET_TO_CLIENT_TIME = 2,
}

#[derive(Debug, Clone, Default)]
pub enum set_atime {
    #[default]
    DONT_CHANGE,
    SET_TO_SERVER_TIME,
    SET_TO_CLIENT_TIME(nfstime3),
}

impl Pack for set_atime {
    fn packed_size(&self) -> usize {
        4 + match self {
            Self::SET_TO_CLIENT_TIME(time) => time.packed_size(),
            _ => 0,
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::DONT_CHANGE => time_how::DONT_CHANGE.pack(out)?,
            Self::SET_TO_SERVER_TIME => time_how::SET_TO_SERVER_TIME.pack(out)?,
            Self::SET_TO_CLIENT_TIME(time) => {
                time_how::SET_TO_CLIENT_TIME.pack(out)? + time.pack(out)?
            }
        };
        Ok(written)
    }
}

impl Unpack for set_atime {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (how, mut read) = i32::unpack(input)?;
        let value = match how {
            0 => Self::DONT_CHANGE,
            1 => Self::SET_TO_SERVER_TIME,
            2 => {
                let (time, n) = nfstime3::unpack(input)?;
                read += n;
                Self::SET_TO_CLIENT_TIME(time)
            }
            other => return Err(Error::InvalidDiscriminant(other)),
        };
        Ok((value, read))
    }
}

#[derive(Debug, Clone, Default)]
pub enum set_mtime {
    #[default]
    DONT_CHANGE,
    SET_TO_SERVER_TIME,
    SET_TO_CLIENT_TIME(nfstime3),
}

impl Pack for set_mtime {
    fn packed_size(&self) -> usize {
        4 + match self {
            Self::SET_TO_CLIENT_TIME(time) => time.packed_size(),
            _ => 0,
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::DONT_CHANGE => time_how::DONT_CHANGE.pack(out)?,
            Self::SET_TO_SERVER_TIME => time_how::SET_TO_SERVER_TIME.pack(out)?,
            Self::SET_TO_CLIENT_TIME(time) => {
                time_how::SET_TO_CLIENT_TIME.pack(out)? + time.pack(out)?
            }
        };
        Ok(written)
    }
}

impl Unpack for set_mtime {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (how, mut read) = i32::unpack(input)?;
        let value = match how {
            0 => Self::DONT_CHANGE,
            1 => Self::SET_TO_SERVER_TIME,
            2 => {
                let (time, n) = nfstime3::unpack(input)?;
                read += n;
                Self::SET_TO_CLIENT_TIME(time)
            }
            other => return Err(Error::InvalidDiscriminant(other)),
        };
        Ok((value, read))
    }
}

/// Six independently-optional attribute setters.
#[derive(Debug, Clone, Default, XdrCodec)]
pub struct sattr3 {
    pub mode: set_mode3,
    pub uid: set_uid3,
    pub gid: set_gid3,
    pub size: set_size3,
    pub atime: set_atime,
    pub mtime: set_mtime,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, XdrCodec)]
#[repr(u32)]
pub enum createmode3 {
    UNCHECKED = 0,
    GUARDED = 1,
    EXCLUSIVE = 2,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct createverf3(pub [u8; NFS3_CREATEVERFSIZE]);

impl Pack for createverf3 {
    fn packed_size(&self) -> usize {
        NFS3_CREATEVERFSIZE
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        pack_fixed_opaque(&self.0, out)
    }
}

impl Unpack for createverf3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (buf, read) = unpack_fixed_opaque::<NFS3_CREATEVERFSIZE>(input)?;
        Ok((Self(buf), read))
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct cookieverf3(pub [u8; NFS3_COOKIEVERFSIZE]);

impl Pack for cookieverf3 {
    fn packed_size(&self) -> usize {
        NFS3_COOKIEVERFSIZE
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        pack_fixed_opaque(&self.0, out)
    }
}

impl Unpack for cookieverf3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (buf, read) = unpack_fixed_opaque::<NFS3_COOKIEVERFSIZE>(input)?;
        Ok((Self(buf), read))
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct writeverf3(pub [u8; NFS3_WRITEVERFSIZE]);

impl Pack for writeverf3 {
    fn packed_size(&self) -> usize {
        NFS3_WRITEVERFSIZE
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        pack_fixed_opaque(&self.0, out)
    }
}

impl Unpack for writeverf3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (buf, read) = unpack_fixed_opaque::<NFS3_WRITEVERFSIZE>(input)?;
        Ok((Self(buf), read))
    }
}

/// How CREATE builds the new file; the discriminator alone selects the
/// arm, so a mismatched arm cannot be constructed.
#[derive(Debug, Clone)]
pub enum createhow3 {
    UNCHECKED(sattr3),
    GUARDED(sattr3),
    EXCLUSIVE(createverf3),
}

impl Pack for createhow3 {
    fn packed_size(&self) -> usize {
        4 + match self {
            Self::UNCHECKED(attrs) | Self::GUARDED(attrs) => attrs.packed_size(),
            Self::EXCLUSIVE(verf) => verf.packed_size(),
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::UNCHECKED(attrs) => createmode3::UNCHECKED.pack(out)? + attrs.pack(out)?,
            Self::GUARDED(attrs) => createmode3::GUARDED.pack(out)? + attrs.pack(out)?,
            Self::EXCLUSIVE(verf) => createmode3::EXCLUSIVE.pack(out)? + verf.pack(out)?,
        };
        Ok(written)
    }
}

impl Unpack for createhow3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (mode, mut read) = i32::unpack(input)?;
        let how = match mode {
            0 => {
                let (attrs, n) = sattr3::unpack(input)?;
                read += n;
                Self::UNCHECKED(attrs)
            }
            1 => {
                let (attrs, n) = sattr3::unpack(input)?;
                read += n;
                Self::GUARDED(attrs)
            }
            2 => {
                let (verf, n) = createverf3::unpack(input)?;
                read += n;
                Self::EXCLUSIVE(verf)
            }
            other => return Err(Error::InvalidDiscriminant(other)),
        };
        Ok((how, read))
    }
}

#[derive(Debug, Clone, XdrCodec)]
pub struct devicedata3 {
    pub dev_attributes: sattr3,
    pub spec: specdata3,
}

/// MKNOD payload, discriminated by the file type being created. Types
/// other than device/socket/fifo carry no payload.
#[derive(Debug, Clone)]
pub enum mknoddata3 {
    NF3CHR(devicedata3),
    NF3BLK(devicedata3),
    NF3SOCK(sattr3),
    NF3FIFO(sattr3),
    Other(ftype3),
}

impl Pack for mknoddata3 {
    fn packed_size(&self) -> usize {
        4 + match self {
            Self::NF3CHR(data) | Self::NF3BLK(data) => data.packed_size(),
            Self::NF3SOCK(attrs) | Self::NF3FIFO(attrs) => attrs.packed_size(),
            Self::Other(_) => 0,
        }
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let written = match self {
            Self::NF3CHR(data) => ftype3::NF3CHR.pack(out)? + data.pack(out)?,
            Self::NF3BLK(data) => ftype3::NF3BLK.pack(out)? + data.pack(out)?,
            Self::NF3SOCK(attrs) => ftype3::NF3SOCK.pack(out)? + attrs.pack(out)?,
            Self::NF3FIFO(attrs) => ftype3::NF3FIFO.pack(out)? + attrs.pack(out)?,
            Self::Other(type_) => type_.pack(out)?,
        };
        Ok(written)
    }
}

impl Unpack for mknoddata3 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (type_, mut read) = ftype3::unpack(input)?;
        let data = match type_ {
            ftype3::NF3CHR => {
                let (data, n) = devicedata3::unpack(input)?;
                read += n;
                Self::NF3CHR(data)
            }
            ftype3::NF3BLK => {
                let (data, n) = devicedata3::unpack(input)?;
                read += n;
                Self::NF3BLK(data)
            }
            ftype3::NF3SOCK => {
                let (attrs, n) = sattr3::unpack(input)?;
                read += n;
                Self::NF3SOCK(attrs)
            }
            ftype3::NF3FIFO => {
                let (attrs, n) = sattr3::unpack(input)?;
                read += n;
                Self::NF3FIFO(attrs)
            }
            other => Self::Other(other),
        };
        Ok((data, read))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, XdrCodec)]
#[repr(u32)]
pub enum stable_how {
    UNSTABLE = 0,
    DATA_SYNC = 1,
    FILE_SYNC = 2,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct diropargs3<'a> {
    pub dir: nfs_fh3,
    pub name: filename3<'a>,
}

#[derive(Debug, Clone, XdrCodec)]
pub struct symlinkdata3<'a> {
    pub symlink_attributes: sattr3,
    pub symlink_data: nfspath3<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, XdrCodec)]
pub struct entry3<'a> {
    pub fileid: fileid3,
    pub name: filename3<'a>,
    pub cookie: cookie3,
}

#[derive(Debug, Clone, XdrCodec)]
pub struct entryplus3<'a> {
    pub fileid: fileid3,
    pub name: filename3<'a>,
    pub cookie: cookie3,
    pub name_attributes: post_op_attr,
    pub name_handle: post_op_fh3,
}

impl entryplus3<'_> {
    /// The entry's handle when the server returned one.
    pub fn handle(&self) -> Option<&nfs_fh3> {
        self.name_handle.as_ref()
    }
}

#[derive(Debug, Default, XdrCodec)]
pub struct dirlist3<'a> {
    pub entries: List<entry3<'a>>,
    pub eof: bool,
}

#[derive(Debug, Default, XdrCodec)]
pub struct dirlistplus3<'a> {
    pub entries: List<entryplus3<'a>>,
    pub eof: bool,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct GETATTR3args {
    pub object: nfs_fh3,
}

#[derive(Debug, XdrCodec)]
pub struct GETATTR3resok {
    pub obj_attributes: fattr3,
}

#[derive(Debug, XdrCodec)]
pub struct SETATTR3args {
    pub object: nfs_fh3,
    pub new_attributes: sattr3,
    pub guard: sattrguard3,
}

#[derive(Debug, XdrCodec)]
pub struct SETATTR3resok {
    pub obj_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct SETATTR3resfail {
    pub obj_wcc: wcc_data,
}

#[derive(Debug, Eq, PartialEq, XdrCodec)]
pub struct LOOKUP3args<'a> {
    pub what: diropargs3<'a>,
}

#[derive(Debug, XdrCodec)]
pub struct LOOKUP3resok {
    pub object: nfs_fh3,
    pub obj_attributes: post_op_attr,
    pub dir_attributes: post_op_attr,
}

#[derive(Debug, Default, XdrCodec)]
pub struct LOOKUP3resfail {
    pub dir_attributes: post_op_attr,
}

#[derive(Debug, XdrCodec)]
pub struct ACCESS3args {
    pub object: nfs_fh3,
    pub access: u32,
}

#[derive(Debug, XdrCodec)]
pub struct ACCESS3resok {
    pub obj_attributes: post_op_attr,
    pub access: u32,
}

#[derive(Debug, XdrCodec)]
pub struct ACCESS3resfail {
    pub obj_attributes: post_op_attr,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct READLINK3args {
    pub symlink: nfs_fh3,
}

#[derive(Debug, XdrCodec)]
pub struct READLINK3resok<'a> {
    pub symlink_attributes: post_op_attr,
    pub data: nfspath3<'a>,
}

#[derive(Debug, Default, XdrCodec)]
pub struct READLINK3resfail {
    pub symlink_attributes: post_op_attr,
}

#[derive(Debug, XdrCodec)]
pub struct READ3args {
    pub file: nfs_fh3,
    pub offset: offset3,
    pub count: count3,
}

#[derive(Debug, XdrCodec)]
pub struct READ3resok<'a> {
    pub file_attributes: post_op_attr,
    pub count: count3,
    pub eof: bool,
    pub data: Opaque<'a>,
}

#[derive(Debug, XdrCodec)]
pub struct READ3resfail {
    pub file_attributes: post_op_attr,
}

#[derive(Debug, XdrCodec)]
pub struct WRITE3args<'a> {
    pub file: nfs_fh3,
    pub offset: offset3,
    pub count: count3,
    pub stable: stable_how,
    pub data: Opaque<'a>,
}

impl<'a> WRITE3args<'a> {
    /// A write of `data` at `offset` with the default FILE_SYNC
    /// stability.
    pub fn new(file: nfs_fh3, offset: offset3, data: Opaque<'a>) -> Self {
        let count = u32::try_from(data.len()).unwrap_or(u32::MAX);
        Self {
            file,
            offset,
            count,
            stable: stable_how::FILE_SYNC,
            data,
        }
    }
}

#[derive(Debug, XdrCodec)]
pub struct WRITE3resok {
    pub file_wcc: wcc_data,
    pub count: count3,
    pub committed: stable_how,
    pub verf: writeverf3,
}

#[derive(Debug, XdrCodec)]
pub struct WRITE3resfail {
    pub file_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct CREATE3args<'a> {
    pub where_: diropargs3<'a>,
    pub how: createhow3,
}

#[derive(Debug, XdrCodec)]
pub struct CREATE3resok {
    pub obj: post_op_fh3,
    pub obj_attributes: post_op_attr,
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct CREATE3resfail {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct MKDIR3args<'a> {
    pub where_: diropargs3<'a>,
    pub attributes: sattr3,
}

#[derive(Debug, XdrCodec)]
pub struct MKDIR3resok {
    pub obj: post_op_fh3,
    pub obj_attributes: post_op_attr,
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct MKDIR3resfail {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct SYMLINK3args<'a> {
    pub where_: diropargs3<'a>,
    pub symlink: symlinkdata3<'a>,
}

#[derive(Debug, XdrCodec)]
pub struct SYMLINK3resok {
    pub obj: post_op_fh3,
    pub obj_attributes: post_op_attr,
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct SYMLINK3resfail {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct MKNOD3args<'a> {
    pub where_: diropargs3<'a>,
    pub what: mknoddata3,
}

#[derive(Debug, XdrCodec)]
pub struct MKNOD3resok {
    pub obj: post_op_fh3,
    pub obj_attributes: post_op_attr,
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct MKNOD3resfail {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, Eq, PartialEq, XdrCodec)]
pub struct REMOVE3args<'a> {
    pub object: diropargs3<'a>,
}

#[derive(Debug, XdrCodec)]
pub struct REMOVE3resok {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct REMOVE3resfail {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, Eq, PartialEq, XdrCodec)]
pub struct RMDIR3args<'a> {
    pub object: diropargs3<'a>,
}

#[derive(Debug, XdrCodec)]
pub struct RMDIR3resok {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct RMDIR3resfail {
    pub dir_wcc: wcc_data,
}

#[derive(Debug, Eq, PartialEq, XdrCodec)]
pub struct RENAME3args<'a, 'b> {
    pub from: diropargs3<'a>,
    pub to: diropargs3<'b>,
}

#[derive(Debug, XdrCodec)]
pub struct RENAME3resok {
    pub fromdir_wcc: wcc_data,
    pub todir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct RENAME3resfail {
    pub fromdir_wcc: wcc_data,
    pub todir_wcc: wcc_data,
}

#[derive(Debug, Eq, PartialEq, XdrCodec)]
pub struct LINK3args<'a> {
    pub file: nfs_fh3,
    pub link: diropargs3<'a>,
}

#[derive(Debug, XdrCodec)]
pub struct LINK3resok {
    pub file_attributes: post_op_attr,
    pub linkdir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct LINK3resfail {
    pub file_attributes: post_op_attr,
    pub linkdir_wcc: wcc_data,
}

#[derive(Debug, XdrCodec)]
pub struct READDIR3args {
    pub dir: nfs_fh3,
    pub cookie: cookie3,
    pub cookieverf: cookieverf3,
    pub count: count3,
}

#[derive(Debug, XdrCodec)]
pub struct READDIR3resok<'a> {
    pub dir_attributes: post_op_attr,
    pub cookieverf: cookieverf3,
    pub reply: dirlist3<'a>,
}

#[derive(Debug, Default, XdrCodec)]
pub struct READDIR3resfail {
    pub dir_attributes: post_op_attr,
}

#[derive(Debug, XdrCodec)]
pub struct READDIRPLUS3args {
    pub dir: nfs_fh3,
    pub cookie: cookie3,
    pub cookieverf: cookieverf3,
    pub dircount: count3,
    pub maxcount: count3,
}

#[derive(Debug, XdrCodec)]
pub struct READDIRPLUS3resok<'a> {
    pub dir_attributes: post_op_attr,
    pub cookieverf: cookieverf3,
    pub reply: dirlistplus3<'a>,
}

#[derive(Debug, Default, XdrCodec)]
pub struct READDIRPLUS3resfail {
    pub dir_attributes: post_op_attr,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct FSSTAT3args {
    pub fsroot: nfs_fh3,
}

#[derive(Debug, XdrCodec)]
pub struct FSSTAT3resok {
    pub obj_attributes: post_op_attr,
    pub tbytes: size3,
    pub fbytes: size3,
    pub abytes: size3,
    pub tfiles: size3,
    pub ffiles: size3,
    pub afiles: size3,
    pub invarsec: u32,
}

#[derive(Debug, XdrCodec)]
pub struct FSSTAT3resfail {
    pub obj_attributes: post_op_attr,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct FSINFO3args {
    pub fsroot: nfs_fh3,
}

#[derive(Debug, XdrCodec)]
pub struct FSINFO3resok {
    pub obj_attributes: post_op_attr,
    pub rtmax: u32,
    pub rtpref: u32,
    pub rtmult: u32,
    pub wtmax: u32,
    pub wtpref: u32,
    pub wtmult: u32,
    pub dtpref: u32,
    pub maxfilesize: size3,
    pub time_delta: nfstime3,
    pub properties: u32,
}

#[derive(Debug, XdrCodec)]
pub struct FSINFO3resfail {
    pub obj_attributes: post_op_attr,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct PATHCONF3args {
    pub object: nfs_fh3,
}

#[derive(Debug, XdrCodec)]
pub struct PATHCONF3resok {
    pub obj_attributes: post_op_attr,
    pub linkmax: u32,
    pub name_max: u32,
    pub no_trunc: bool,
    pub chown_restricted: bool,
    pub case_insensitive: bool,
    pub case_preserving: bool,
}

#[derive(Debug, XdrCodec)]
pub struct PATHCONF3resfail {
    pub obj_attributes: post_op_attr,
}

#[derive(Debug, Clone, Eq, PartialEq, XdrCodec)]
pub struct COMMIT3args {
    pub file: nfs_fh3,
    pub offset: offset3,
    pub count: count3,
}

#[derive(Debug, XdrCodec)]
pub struct COMMIT3resok {
    pub file_wcc: wcc_data,
    pub verf: writeverf3,
}

#[derive(Debug, XdrCodec)]
pub struct COMMIT3resfail {
    pub file_wcc: wcc_data,
}

pub type ACCESS3res = Nfs3Result<ACCESS3resok, ACCESS3resfail>;
pub type COMMIT3res = Nfs3Result<COMMIT3resok, COMMIT3resfail>;
pub type CREATE3res = Nfs3Result<CREATE3resok, CREATE3resfail>;
pub type FSINFO3res = Nfs3Result<FSINFO3resok, FSINFO3resfail>;
pub type FSSTAT3res = Nfs3Result<FSSTAT3resok, FSSTAT3resfail>;
pub type GETATTR3res = Nfs3Result<GETATTR3resok, Void>;
pub type LINK3res = Nfs3Result<LINK3resok, LINK3resfail>;
pub type LOOKUP3res = Nfs3Result<LOOKUP3resok, LOOKUP3resfail>;
pub type MKDIR3res = Nfs3Result<MKDIR3resok, MKDIR3resfail>;
pub type MKNOD3res = Nfs3Result<MKNOD3resok, MKNOD3resfail>;
pub type PATHCONF3res = Nfs3Result<PATHCONF3resok, PATHCONF3resfail>;
pub type READ3res<'a> = Nfs3Result<READ3resok<'a>, READ3resfail>;
pub type READDIR3res<'a> = Nfs3Result<READDIR3resok<'a>, READDIR3resfail>;
pub type READDIRPLUS3res<'a> = Nfs3Result<READDIRPLUS3resok<'a>, READDIRPLUS3resfail>;
pub type READLINK3res<'a> = Nfs3Result<READLINK3resok<'a>, READLINK3resfail>;
pub type REMOVE3res = Nfs3Result<REMOVE3resok, REMOVE3resfail>;
pub type RENAME3res = Nfs3Result<RENAME3resok, RENAME3resfail>;
pub type RMDIR3res = Nfs3Result<RMDIR3resok, RMDIR3resfail>;
pub type SETATTR3res = Nfs3Result<SETATTR3resok, SETATTR3resfail>;
pub type SYMLINK3res = Nfs3Result<SYMLINK3resok, SYMLINK3resfail>;
pub type WRITE3res = Nfs3Result<WRITE3resok, WRITE3resfail>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, XdrCodec)]
#[repr(u32)]
pub enum NFS_PROGRAM {
    NFSPROC3_NULL = 0,
    NFSPROC3_GETATTR = 1,
    NFSPROC3_SETATTR = 2,
    NFSPROC3_LOOKUP = 3,
    NFSPROC3_ACCESS = 4,
    NFSPROC3_READLINK = 5,
    NFSPROC3_READ = 6,
    NFSPROC3_WRITE = 7,
    NFSPROC3_CREATE = 8,
    NFSPROC3_MKDIR = 9,
    NFSPROC3_SYMLINK = 10,
    NFSPROC3_MKNOD = 11,
    NFSPROC3_REMOVE = 12,
    NFSPROC3_RMDIR = 13,
    NFSPROC3_RENAME = 14,
    NFSPROC3_LINK = 15,
    NFSPROC3_READDIR = 16,
    NFSPROC3_READDIRPLUS = 17,
    NFSPROC3_FSSTAT = 18,
    NFSPROC3_FSINFO = 19,
    NFSPROC3_PATHCONF = 20,
    NFSPROC3_COMMIT = 21,
}

impl NFS_PROGRAM {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NFSPROC3_NULL => "NULL",
            Self::NFSPROC3_GETATTR => "GETATTR",
            Self::NFSPROC3_SETATTR => "SETATTR",
            Self::NFSPROC3_LOOKUP => "LOOKUP",
            Self::NFSPROC3_ACCESS => "ACCESS",
            Self::NFSPROC3_READLINK => "READLINK",
            Self::NFSPROC3_READ => "READ",
            Self::NFSPROC3_WRITE => "WRITE",
            Self::NFSPROC3_CREATE => "CREATE",
            Self::NFSPROC3_MKDIR => "MKDIR",
            Self::NFSPROC3_SYMLINK => "SYMLINK",
            Self::NFSPROC3_MKNOD => "MKNOD",
            Self::NFSPROC3_REMOVE => "REMOVE",
            Self::NFSPROC3_RMDIR => "RMDIR",
            Self::NFSPROC3_RENAME => "RENAME",
            Self::NFSPROC3_LINK => "LINK",
            Self::NFSPROC3_READDIR => "READDIR",
            Self::NFSPROC3_READDIRPLUS => "READDIRPLUS",
            Self::NFSPROC3_FSSTAT => "FSSTAT",
            Self::NFSPROC3_FSINFO => "FSINFO",
            Self::NFSPROC3_PATHCONF => "PATHCONF",
            Self::NFSPROC3_COMMIT => "COMMIT",
        }
    }
}
