use std::io::{Read, Write};

use super::error::{Error, Result};
use super::traits::{Pack, Unpack};

/// An XDR optional-chain list: every element is prefixed by a `1` marker
/// and the sequence ends with a single `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List<T>(pub Vec<T>);

impl<T> Default for List<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> List<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: Pack> Pack for List<T> {
    fn packed_size(&self) -> usize {
        self.0
            .iter()
            .map(|item| 4 + item.packed_size())
            .sum::<usize>()
            + 4
    }

    fn pack(&self, out: &mut impl Write) -> Result<usize> {
        let mut written = 0;
        for item in &self.0 {
            written += true.pack(out)?;
            written += item.pack(out)?;
        }
        written += false.pack(out)?;
        Ok(written)
    }
}

impl<T: Unpack> Unpack for List<T> {
    fn unpack(input: &mut impl Read) -> Result<(Self, usize)> {
        let mut items = Vec::new();
        let mut read = 0;
        loop {
            let (marker, n) = u32::unpack(input)?;
            read += n;
            match marker {
                0 => break,
                1 => {
                    let (item, n) = T::unpack(input)?;
                    read += n;
                    items.push(item);
                }
                other => return Err(Error::InvalidListMarker(other)),
            }
        }
        Ok((Self(items), read))
    }
}
