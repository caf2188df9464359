use std::io::{Read, Write};

use super::error::{Error, Result};

pub trait Pack {
    /// Size of the encoded form in bytes. Always a multiple of 4.
    fn packed_size(&self) -> usize;

    /// Encodes `self`, returning the number of bytes written.
    fn pack(&self, out: &mut impl Write) -> Result<usize>;
}

pub trait Unpack: Sized {
    /// Decodes a value, returning it with the number of bytes consumed.
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)>;
}

impl Pack for u32 {
    fn packed_size(&self) -> usize {
        4
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        out.write_all(&self.to_be_bytes())?;
        Ok(4)
    }
}

impl Unpack for u32 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let mut buf = [0u8; 4];
        input.read_exact(&mut buf)?;
        Ok((Self::from_be_bytes(buf), 4))
    }
}

impl Pack for i32 {
    fn packed_size(&self) -> usize {
        4
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        out.write_all(&self.to_be_bytes())?;
        Ok(4)
    }
}

impl Unpack for i32 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let mut buf = [0u8; 4];
        input.read_exact(&mut buf)?;
        Ok((Self::from_be_bytes(buf), 4))
    }
}

impl Pack for u64 {
    fn packed_size(&self) -> usize {
        8
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        out.write_all(&self.to_be_bytes())?;
        Ok(8)
    }
}

impl Unpack for u64 {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let mut buf = [0u8; 8];
        input.read_exact(&mut buf)?;
        Ok((Self::from_be_bytes(buf), 8))
    }
}

impl Pack for bool {
    fn packed_size(&self) -> usize {
        4
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        u32::from(*self).pack(out)
    }
}

impl Unpack for bool {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (value, read) = u32::unpack(input)?;
        match value {
            0 => Ok((false, read)),
            1 => Ok((true, read)),
            _ => Err(Error::InvalidEnumValue(value)),
        }
    }
}

/// Counted arrays: a length word followed by that many elements.
impl<T: Pack> Pack for Vec<T> {
    fn packed_size(&self) -> usize {
        4 + self.iter().map(Pack::packed_size).sum::<usize>()
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let len = u32::try_from(self.len()).map_err(|_| Error::ObjectTooLarge(self.len()))?;
        let mut written = len.pack(out)?;
        for item in self {
            written += item.pack(out)?;
        }
        Ok(written)
    }
}

impl<T: Unpack> Unpack for Vec<T> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let (len, mut read) = u32::unpack(input)?;
        let mut items = Self::new();
        for _ in 0..len {
            let (item, n) = T::unpack(input)?;
            read += n;
            items.push(item);
        }
        Ok((items, read))
    }
}
