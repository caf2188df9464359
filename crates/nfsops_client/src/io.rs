//! Byte-stream abstractions so the protocol stack stays independent of
//! the runtime. Implementations for tokio live in [`crate::tokio`].

use std::io::{Error, ErrorKind, Result};

pub trait AsyncRead {
    fn async_read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize>>;

    /// Fills `buf` completely. A zero-length read means the peer closed
    /// the connection and surfaces as `UnexpectedEof`.
    fn async_read_exact(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<()>> {
        async move {
            let mut buf = buf;
            while !buf.is_empty() {
                let n = self.async_read(buf).await?;
                if n == 0 {
                    return Err(Error::from(ErrorKind::UnexpectedEof));
                }
                buf = &mut buf[n..];
            }
            Ok(())
        }
    }
}

pub trait AsyncWrite {
    fn async_write(&mut self, buf: &[u8]) -> impl Future<Output = Result<usize>>;

    fn async_write_all(&mut self, buf: &[u8]) -> impl Future<Output = Result<()>> {
        async move {
            let mut buf = buf;
            while !buf.is_empty() {
                let n = self.async_write(buf).await?;
                if n == 0 {
                    return Err(Error::from(ErrorKind::WriteZero));
                }
                buf = &buf[n..];
            }
            Ok(())
        }
    }
}
