//! Connection establishment abstraction.

use std::net::SocketAddr;

use crate::io::{AsyncRead, AsyncWrite};

pub trait Connector {
    type Connection: AsyncRead + AsyncWrite;

    fn connect(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = std::io::Result<Self::Connection>>;

    /// Connects with the local end bound to `local`. Used for the
    /// reserved-port scan; connectors that cannot bind fall back to a
    /// plain connect, which loses the privileged-port property.
    fn connect_from(
        &self,
        host: &str,
        port: u16,
        local: SocketAddr,
    ) -> impl Future<Output = std::io::Result<Self::Connection>> {
        let _ = local;
        self.connect(host, port)
    }
}
