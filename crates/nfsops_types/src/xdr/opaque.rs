use std::borrow::Cow;
use std::fmt;
use std::io::{Read, Write};

use super::error::{Error, Result};
use super::traits::{Pack, Unpack};
use super::util::{padded_len, zero_padding};

/// A variable-length opaque: a length word, the bytes, and zero padding
/// to a 4-byte boundary.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opaque<'a>(pub Cow<'a, [u8]>);

impl Opaque<'static> {
    pub const fn owned(data: Vec<u8>) -> Self {
        Self(Cow::Owned(data))
    }
}

impl<'a> Opaque<'a> {
    pub const fn borrowed(data: &'a [u8]) -> Self {
        Self(Cow::Borrowed(data))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extracts the owned data, cloning if it is borrowed.
    pub fn into_owned(self) -> Vec<u8> {
        self.0.into_owned()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

const MAX_DEBUG_BYTES: usize = 8;

impl fmt::Debug for Opaque<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque(len={}, 0x", self.len())?;
        for byte in self.0.iter().take(MAX_DEBUG_BYTES) {
            write!(f, "{byte:02x}")?;
        }
        if self.len() > MAX_DEBUG_BYTES {
            write!(f, "..")?;
        }
        write!(f, ")")
    }
}

impl Pack for Opaque<'_> {
    fn packed_size(&self) -> usize {
        4 + padded_len(self.0.len())
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let len = u32::try_from(self.0.len()).map_err(|_| Error::ObjectTooLarge(self.0.len()))?;
        let mut written = len.pack(out)?;
        out.write_all(&self.0)?;
        written += self.0.len();
        let padding = zero_padding(self.0.len());
        out.write_all(padding)?;
        written += padding.len();
        Ok(written)
    }
}

impl<'a> Unpack for Opaque<'a> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (len, mut read) = u32::unpack(input)?;
        let len = len as usize;

        let mut buf = vec![0u8; len];
        input.read_exact(&mut buf)?;
        read += len;

        let pad = padded_len(len) - len;
        if pad > 0 {
            let mut scratch = [0u8; 3];
            input.read_exact(&mut scratch[..pad])?;
            read += pad;
        }

        Ok((Self(Cow::Owned(buf)), read))
    }
}

impl AsRef<[u8]> for Opaque<'_> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<Vec<u8>> for Opaque<'static> {
    fn from(data: Vec<u8>) -> Self {
        Self(Cow::Owned(data))
    }
}

impl<'a> From<&'a [u8]> for Opaque<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self(Cow::Borrowed(data))
    }
}
