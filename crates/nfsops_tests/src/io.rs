//! An in-memory duplex channel standing in for a TCP connection, plus a
//! connector that hands out pre-created connections.

use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Result};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use nfsops_client::io::{AsyncRead, AsyncWrite};
use nfsops_client::net::Connector;
use nfsops_types::rpc::fragment_header;

/// Client-side endpoint. Reading yields whatever the server end sent;
/// a closed peer reads as EOF.
pub struct MockChannel {
    rx: UnboundedReceiver<Vec<u8>>,
    tx: UnboundedSender<Vec<u8>>,
    pending: Vec<u8>,
}

/// Server-side endpoint with record-level send/receive.
pub struct ServerEnd {
    rx: UnboundedReceiver<Vec<u8>>,
    tx: UnboundedSender<Vec<u8>>,
    buf: Vec<u8>,
}

/// A connected (client, server) pair.
pub fn duplex() -> (MockChannel, ServerEnd) {
    let (client_tx, server_rx) = unbounded_channel();
    let (server_tx, client_rx) = unbounded_channel();
    (
        MockChannel {
            rx: client_rx,
            tx: client_tx,
            pending: Vec::new(),
        },
        ServerEnd {
            rx: server_rx,
            tx: server_tx,
            buf: Vec::new(),
        },
    )
}

impl AsyncRead for MockChannel {
    async fn async_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv().await {
                Some(chunk) => self.pending = chunk,
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

impl AsyncWrite for MockChannel {
    async fn async_write(&mut self, buf: &[u8]) -> Result<usize> {
        self.tx
            .send(buf.to_vec())
            .map_err(|_| Error::from(ErrorKind::BrokenPipe))?;
        Ok(buf.len())
    }
}

impl ServerEnd {
    /// Receives one record, reassembling fragments. `None` when the
    /// client side is gone.
    pub async fn recv_record(&mut self) -> Option<Vec<u8>> {
        let mut record = Vec::new();
        loop {
            while self.buf.len() < 4 {
                self.fill().await?;
            }
            let mut header = [0u8; 4];
            header.copy_from_slice(&self.buf[..4]);
            let header = fragment_header::from(header);
            let length = header.fragment_length() as usize;

            while self.buf.len() < 4 + length {
                self.fill().await?;
            }
            record.extend_from_slice(&self.buf[4..4 + length]);
            self.buf.drain(..4 + length);

            if header.is_last() {
                return Some(record);
            }
        }
    }

    async fn fill(&mut self) -> Option<()> {
        let chunk = self.rx.recv().await?;
        self.buf.extend_from_slice(&chunk);
        Some(())
    }

    /// Sends a payload as one record.
    pub fn send_record(&self, payload: &[u8]) {
        let header = fragment_header::new(payload.len() as u32, true);
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(payload);
        let _ = self.tx.send(bytes);
    }

    /// Sends a payload split into fragments of at most `fragment_size`
    /// bytes, each with its own record-marking header.
    pub fn send_fragmented(&self, payload: &[u8], fragment_size: usize) {
        assert!(fragment_size > 0);
        let mut offset = 0;
        while offset < payload.len() {
            let end = (offset + fragment_size).min(payload.len());
            let last = end == payload.len();
            let header = fragment_header::new((end - offset) as u32, last);
            let mut bytes = header.to_bytes().to_vec();
            bytes.extend_from_slice(&payload[offset..end]);
            let _ = self.tx.send(bytes);
            offset = end;
        }
    }

    /// Consumes incoming data until the client side closes.
    pub async fn drain(&mut self) {
        while self.rx.recv().await.is_some() {}
    }
}

/// Hands out pre-created channel endpoints in order, one per connect.
/// The target host and port are ignored, so portmapper and program
/// conversations are distinguished purely by endpoint order.
#[derive(Clone, Default)]
pub struct MockConnector {
    endpoints: Arc<Mutex<VecDeque<MockChannel>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a connection for the next `connect` call and returns its
    /// server end.
    pub fn add_endpoint(&self) -> ServerEnd {
        let (client, server) = duplex();
        self.endpoints
            .lock()
            .expect("endpoint queue poisoned")
            .push_back(client);
        server
    }
}

impl Connector for MockConnector {
    type Connection = MockChannel;

    async fn connect(&self, _host: &str, _port: u16) -> Result<Self::Connection> {
        self.endpoints
            .lock()
            .expect("endpoint queue poisoned")
            .pop_front()
            .ok_or_else(|| Error::from(ErrorKind::ConnectionRefused))
    }
}
