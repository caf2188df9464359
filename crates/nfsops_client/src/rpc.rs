//! ONC RPC transport: one TCP connection, one outstanding call,
//! per-attempt deadlines, reconnect-on-error and process-wide XID
//! discipline.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use tokio::time::Instant;

use nfsops_types::rpc::{
    RPC_VERSION_2, accept_stat_data, call_body, msg_body, msg_type, rejected_reply, reply_body,
    rpc_msg,
};
use nfsops_types::xdr::{Pack, Unpack};

use crate::auth::{self, CredFlavor};
use crate::error::{Error, RpcError};
use crate::frame;
use crate::net::Connector;

/// Default per-attempt timeout for a single RPC try.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts at the transport layer.
pub const DEFAULT_TRIES: u32 = 2;

fn xid_counter() -> &'static Mutex<u32> {
    static COUNTER: OnceLock<Mutex<u32>> = OnceLock::new();
    COUNTER.get_or_init(|| Mutex::new(rand::random::<u32>() & 0x3FFF_FFFF))
}

/// Allocates a fresh XID. XIDs start at a random value and are strictly
/// increasing for the life of the process, across every client and every
/// reconnect.
pub(crate) fn next_xid() -> u32 {
    let mut last = xid_counter().lock().expect("xid counter poisoned");
    *last = last.wrapping_add(1);
    *last
}

/// Records an XID observed on the wire so later allocations stay above
/// it.
pub(crate) fn observe_xid(xid: u32) {
    let mut last = xid_counter().lock().expect("xid counter poisoned");
    if xid > *last {
        *last = xid;
    }
}

/// The deadline of one RPC attempt. Upper layers express timeouts
/// relative to the attempt; lower layers propagate the absolute instant.
#[derive(Debug, Clone, Copy)]
pub enum Deadline {
    Relative(Duration),
    Absolute(Instant),
}

impl Deadline {
    pub(crate) fn as_instant(self) -> Instant {
        match self {
            Self::Relative(timeout) => Instant::now() + timeout,
            Self::Absolute(instant) => instant,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::Relative(DEFAULT_TIMEOUT)
    }
}

#[derive(Debug, Clone)]
pub struct CallOptions {
    pub deadline: Deadline,
    /// Total attempts, at least 1.
    pub tries: u32,
    /// Caller-supplied XID. When set, the caller owns re-use semantics:
    /// retries keep this XID and JUKEBOX results are not re-issued.
    pub xid: Option<u32>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            deadline: Deadline::default(),
            tries: DEFAULT_TRIES,
            xid: None,
        }
    }
}

impl CallOptions {
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            deadline: Deadline::Relative(timeout),
            ..Self::default()
        }
    }

    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_xid(mut self, xid: u32) -> Self {
        self.xid = Some(xid);
        self
    }
}

/// Local binding policy for outgoing connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindOptions {
    /// Scan for a free port below 1024. Some servers only trust mounts
    /// from privileged ports.
    pub reserved: bool,
    pub addr: Option<IpAddr>,
}

/// RPC client for one (program, version) on one server.
pub struct RpcClient<C: Connector> {
    connector: C,
    host: String,
    port: u16,
    prog: u32,
    vers: u32,
    bind: BindOptions,
    cred_flavor: CredFlavor,
    conn: Option<C::Connection>,
    need_reconnect: bool,
    ever_connected: bool,
    cred: Option<nfsops_types::rpc::opaque_auth<'static>>,
    verf: Option<nfsops_types::rpc::opaque_auth<'static>>,
}

impl<C: Connector> RpcClient<C> {
    pub fn new(connector: C, host: impl Into<String>, port: u16, prog: u32, vers: u32) -> Self {
        Self {
            connector,
            host: host.into(),
            port,
            prog,
            vers,
            bind: BindOptions::default(),
            cred_flavor: CredFlavor::Null,
            conn: None,
            need_reconnect: true,
            ever_connected: false,
            cred: None,
            verf: None,
        }
    }

    pub fn with_cred_flavor(mut self, flavor: CredFlavor) -> Self {
        self.cred_flavor = flavor;
        self
    }

    pub fn with_bind(mut self, bind: BindOptions) -> Self {
        self.bind = bind;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Drops the connection. The next call reconnects.
    pub fn close(&mut self) {
        self.conn = None;
        self.need_reconnect = true;
    }

    /// Issues one RPC and decodes the result body as `R`.
    ///
    /// Timeouts are retried on the same XID without reconnecting, so a
    /// late reply can still be matched. Wire and decode errors tear the
    /// connection down and retry. Reply-dispatch failures (wrong message
    /// type, XID mismatch, MSG_DENIED, non-SUCCESS accept-stat) are
    /// returned without further attempts.
    pub async fn call<A: Pack, R: Unpack>(
        &mut self,
        proc: u32,
        args: &A,
        opts: &CallOptions,
    ) -> Result<R, Error> {
        assert!(opts.tries >= 1, "tries must be at least 1");
        let xid = opts.xid.unwrap_or_else(next_xid);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let deadline = opts.deadline.as_instant();
            match self.call_once(proc, args, xid, deadline).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retry = match &err {
                        Error::Timeout => true,
                        Error::Io(_) | Error::Xdr(_) | Error::PortUnavailable => {
                            self.need_reconnect = true;
                            true
                        }
                        _ => false,
                    };
                    if !retry || attempt >= opts.tries {
                        tracing::warn!(
                            prog = self.prog,
                            proc,
                            xid,
                            attempt,
                            error = %err,
                            "call failed, will not retry"
                        );
                        return Err(err);
                    }
                    tracing::warn!(
                        prog = self.prog,
                        proc,
                        xid,
                        attempt,
                        error = %err,
                        "call failed, will retry"
                    );
                }
            }
        }
    }

    async fn call_once<A: Pack, R: Unpack>(
        &mut self,
        proc: u32,
        args: &A,
        xid: u32,
        deadline: Instant,
    ) -> Result<R, Error> {
        if self.need_reconnect || self.conn.is_none() {
            self.reconnect(deadline).await?;
        }
        self.ensure_auth()?;
        observe_xid(xid);

        let mut record = vec![0u8; frame::HEADER_RESERVE];
        {
            let (Some(cred), Some(verf)) = (&self.cred, &self.verf) else {
                unreachable!("auth cached by ensure_auth");
            };
            let msg = rpc_msg {
                xid,
                body: msg_body::CALL(call_body {
                    rpcvers: RPC_VERSION_2,
                    prog: self.prog,
                    vers: self.vers,
                    proc,
                    cred: cred.borrow(),
                    verf: verf.borrow(),
                }),
            };
            msg.pack(&mut record)?;
            args.pack(&mut record)?;
        }

        let Some(conn) = self.conn.as_mut() else {
            unreachable!("connection established by reconnect");
        };
        frame::send_record(conn, &mut record, deadline).await?;
        let reply = frame::read_record(conn, deadline).await?;
        self.parse_reply::<R>(&reply, xid)
    }

    fn parse_reply<R: Unpack>(&mut self, record: &[u8], expect_xid: u32) -> Result<R, Error> {
        let total = record.len() as u64;
        let mut cursor = std::io::Cursor::new(record);

        let (xid, _) = u32::unpack(&mut cursor)?;
        observe_xid(xid);
        let (mtype, _) = u32::unpack(&mut cursor)?;
        if mtype != msg_type::REPLY as u32 {
            self.need_reconnect = true;
            return Err(RpcError::UnexpectedMessageType(mtype).into());
        }
        if xid != expect_xid {
            self.need_reconnect = true;
            return Err(RpcError::XidMismatch {
                expected: expect_xid,
                got: xid,
            }
            .into());
        }

        let (body, _) = reply_body::unpack(&mut cursor)?;
        match body {
            reply_body::MSG_ACCEPTED(reply) => match reply.reply_data {
                accept_stat_data::SUCCESS => {
                    let (value, _) = R::unpack(&mut cursor)?;
                    if cursor.position() != total {
                        self.need_reconnect = true;
                        return Err(RpcError::TrailingBytes {
                            consumed: cursor.position(),
                            total,
                        }
                        .into());
                    }
                    Ok(value)
                }
                accept_stat_data::PROG_UNAVAIL => Err(RpcError::ProgUnavail.into()),
                accept_stat_data::PROG_MISMATCH { low, high } => {
                    Err(RpcError::ProgMismatch { low, high }.into())
                }
                accept_stat_data::PROC_UNAVAIL => Err(RpcError::ProcUnavail.into()),
                accept_stat_data::GARBAGE_ARGS => Err(RpcError::GarbageArgs.into()),
                accept_stat_data::SYSTEM_ERR => Err(RpcError::SystemErr.into()),
            },
            reply_body::MSG_DENIED(rejected_reply::RPC_MISMATCH { low, high }) => {
                Err(RpcError::RpcMismatch { low, high }.into())
            }
            reply_body::MSG_DENIED(rejected_reply::AUTH_ERROR(stat)) => {
                Err(RpcError::AuthError(stat).into())
            }
        }
    }

    async fn reconnect(&mut self, deadline: Instant) -> Result<(), Error> {
        if self.ever_connected {
            tracing::debug!(
                host = %self.host,
                port = self.port,
                prog = self.prog,
                "reconnect begin"
            );
        }
        self.ever_connected = true;
        self.conn = None;
        self.cred = None;
        self.verf = None;

        let conn = if self.bind.reserved {
            let addr = self.bind.addr.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            self.connect_reserved(addr, deadline).await?
        } else if let Some(addr) = self.bind.addr {
            let local = SocketAddr::new(addr, 0);
            frame::with_deadline(
                deadline,
                self.connector.connect_from(&self.host, self.port, local),
            )
            .await?
        } else {
            frame::with_deadline(deadline, self.connector.connect(&self.host, self.port)).await?
        };

        self.conn = Some(conn);
        self.need_reconnect = false;
        tracing::debug!(
            host = %self.host,
            port = self.port,
            prog = self.prog,
            "connected"
        );
        Ok(())
    }

    /// Scans 1023 down to 1 for a bindable reserved port. The bind and
    /// connect are one atomic step per port; only an in-use port moves
    /// the scan along.
    async fn connect_reserved(
        &self,
        addr: IpAddr,
        deadline: Instant,
    ) -> Result<C::Connection, Error> {
        for port in (1..=1023u16).rev() {
            let local = SocketAddr::new(addr, port);
            match frame::with_deadline(
                deadline,
                self.connector.connect_from(&self.host, self.port, local),
            )
            .await
            {
                Ok(conn) => return Ok(conn),
                Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::AddrInUse => {}
                Err(e) => return Err(e),
            }
        }
        Err(Error::PortUnavailable)
    }

    fn ensure_auth(&mut self) -> Result<(), Error> {
        if self.cred.is_none() {
            self.cred = Some(self.cred_flavor.build()?);
        }
        if self.verf.is_none() {
            self.verf = Some(auth::null());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xids_are_strictly_increasing() {
        let first = next_xid();
        let second = next_xid();
        let third = next_xid();
        assert!(first < second && second < third);
    }

    #[test]
    fn observed_xids_advance_the_counter() {
        let current = next_xid();
        observe_xid(current + 1000);
        let next = next_xid();
        assert!(next > current + 1000);
    }
}
