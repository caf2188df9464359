//! Wrappers for tokio's networking types.

use std::io::{Error, ErrorKind, Result};
use std::net::SocketAddr;

use tokio::net::{TcpSocket, TcpStream, lookup_host};

use crate::io::{AsyncRead, AsyncWrite};
use crate::net::Connector;

/// Adapts any tokio byte stream to the crate's IO traits.
pub struct TokioIo<T>(T);

impl<T> TokioIo<T> {
    pub const fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T> AsyncRead for TokioIo<T>
where
    T: tokio::io::AsyncRead + Unpin,
{
    async fn async_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        tokio::io::AsyncReadExt::read(&mut self.0, buf).await
    }
}

impl<T> AsyncWrite for TokioIo<T>
where
    T: tokio::io::AsyncWrite + Unpin,
{
    async fn async_write(&mut self, buf: &[u8]) -> Result<usize> {
        tokio::io::AsyncWriteExt::write(&mut self.0, buf).await
    }
}

/// Connects over TCP with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioConnector;

impl TokioConnector {
    async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
        lookup_host((host, port))
            .await?
            .next()
            .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("cannot resolve {host}")))
    }
}

impl Connector for TokioConnector {
    type Connection = TokioIo<TcpStream>;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Connection> {
        let stream = TcpStream::connect((host, port)).await?;
        Ok(TokioIo::new(stream))
    }

    async fn connect_from(
        &self,
        host: &str,
        port: u16,
        local: SocketAddr,
    ) -> Result<Self::Connection> {
        let remote = Self::resolve(host, port).await?;
        let socket = if remote.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.bind(local)?;
        let stream = socket.connect(remote).await?;
        Ok(TokioIo::new(stream))
    }
}
