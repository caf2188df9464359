//! RFC 1831 record marking: a record is a sequence of fragments, each
//! prefixed by a 4-byte header carrying the fragment length and a
//! last-fragment bit. Reads reassemble fragments; writes emit a single
//! fragment. All socket operations honor the per-attempt deadline.

use tokio::time::Instant;

use nfsops_types::rpc::fragment_header;

use crate::error::Error;
use crate::io::{AsyncRead, AsyncWrite};

/// Space reserved at the front of an outgoing buffer for the record
/// header.
pub(crate) const HEADER_RESERVE: usize = 4;

pub(crate) async fn with_deadline<T>(
    deadline: Instant,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T, Error> {
    if Instant::now() >= deadline {
        return Err(Error::Timeout);
    }
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Error::Io(e)),
        Err(_) => Err(Error::Timeout),
    }
}

/// Sends `record` as one fragment. The first [`HEADER_RESERVE`] bytes of
/// `record` must be reserved for the header and are overwritten here.
pub(crate) async fn send_record<IO: AsyncWrite>(
    io: &mut IO,
    record: &mut [u8],
    deadline: Instant,
) -> Result<(), Error> {
    debug_assert!(record.len() >= HEADER_RESERVE);
    let length = u32::try_from(record.len() - HEADER_RESERVE)
        .map_err(|_| nfsops_types::xdr::Error::ObjectTooLarge(record.len()))?;
    let header = fragment_header::new(length, true);
    record[..HEADER_RESERVE].copy_from_slice(&header.to_bytes());
    with_deadline(deadline, io.async_write_all(record)).await
}

/// Reads one record, concatenating fragments until the last-fragment bit.
pub(crate) async fn read_record<IO: AsyncRead>(
    io: &mut IO,
    deadline: Instant,
) -> Result<Vec<u8>, Error> {
    let mut record = Vec::new();
    loop {
        let mut header = [0u8; 4];
        with_deadline(deadline, io.async_read_exact(&mut header)).await?;
        let header = fragment_header::from(header);

        let length = header.fragment_length() as usize;
        let start = record.len();
        record.resize(start + length, 0);
        with_deadline(deadline, io.async_read_exact(&mut record[start..])).await?;

        if header.is_last() {
            return Ok(record);
        }
    }
}
