use std::io::{Read, Write};

use super::error::Result;

/// Rounds `len` up to the next 4-byte boundary.
#[inline]
pub const fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Number of zero bytes that follow `len` bytes of payload.
#[inline]
pub(crate) const fn pad_of(len: usize) -> usize {
    padded_len(len) - len
}

#[inline]
pub(crate) fn zero_padding(len: usize) -> &'static [u8] {
    const ZEROES: [u8; 3] = [0, 0, 0];
    &ZEROES[..pad_of(len)]
}

/// Writes a fixed-size opaque: the bytes themselves (no length word)
/// followed by padding.
pub fn pack_fixed_opaque(data: &[u8], out: &mut impl Write) -> Result<usize> {
    out.write_all(data)?;
    let padding = zero_padding(data.len());
    out.write_all(padding)?;
    Ok(data.len() + padding.len())
}

/// Reads a fixed-size opaque of `N` bytes, consuming the padding.
pub fn unpack_fixed_opaque<const N: usize>(input: &mut impl Read) -> Result<([u8; N], usize)> {
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    let pad = pad_of(N);
    if pad > 0 {
        let mut scratch = [0u8; 3];
        input.read_exact(&mut scratch[..pad])?;
    }
    Ok((buf, N + pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_len_rounds_up() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(5), 8);
        assert_eq!(padded_len(8), 8);
    }

    #[test]
    fn zero_padding_fills_to_boundary() {
        assert_eq!(zero_padding(0), &[] as &[u8]);
        assert_eq!(zero_padding(1), &[0, 0, 0]);
        assert_eq!(zero_padding(2), &[0, 0]);
        assert_eq!(zero_padding(3), &[0]);
        assert_eq!(zero_padding(4), &[] as &[u8]);
    }

    #[test]
    fn fixed_opaque_round_trip() {
        let mut buf = Vec::new();
        let written = pack_fixed_opaque(&[1, 2, 3, 4, 5], &mut buf).expect("pack");
        assert_eq!(written, 8);
        assert_eq!(buf, [1, 2, 3, 4, 5, 0, 0, 0]);

        let mut cursor = std::io::Cursor::new(buf);
        let (data, read) = unpack_fixed_opaque::<5>(&mut cursor).expect("unpack");
        assert_eq!(read, 8);
        assert_eq!(data, [1, 2, 3, 4, 5]);
    }
}
