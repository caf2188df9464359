//! Portmapper client (RFC 1833, version 2). Always TCP, always port 111.

use nfsops_types::portmap::{IPPROTO_TCP, PMAP_PORT, PMAP_PROG, PROGRAM, VERSION, mapping};
use nfsops_types::xdr::{Pack, Unpack, Void};

use crate::error::{Error, PortmapError};
use crate::net::Connector;
use crate::rpc::{CallOptions, RpcClient};

pub struct PortmapperClient<C: Connector> {
    rpc: RpcClient<C>,
}

impl<C: Connector> PortmapperClient<C> {
    /// The connection opens lazily on the first call.
    pub fn new(connector: C, host: &str) -> Self {
        Self {
            rpc: RpcClient::new(connector, host, PMAP_PORT, PROGRAM, VERSION),
        }
    }

    pub async fn null(&mut self) -> Result<(), Error> {
        let Void = self.call::<Void, Void>(PMAP_PROG::PMAPPROC_NULL, &Void).await?;
        Ok(())
    }

    /// Looks up the TCP port of `(prog, vers)`. A result of 0 means the
    /// program is not registered.
    pub async fn getport(&mut self, prog: u32, vers: u32) -> Result<u16, Error> {
        let args = mapping {
            prog,
            vers,
            prot: IPPROTO_TCP,
            port: 0,
        };
        let port = self.call::<mapping, u32>(PMAP_PROG::PMAPPROC_GETPORT, &args).await?;
        match u16::try_from(port) {
            Ok(0) => Err(PortmapError::ProgramUnavailable.into()),
            Ok(port) => Ok(port),
            Err(_) => Err(PortmapError::InvalidPortValue(port).into()),
        }
    }

    pub async fn dump(&mut self) -> Result<Vec<mapping>, Error> {
        let list = self
            .call::<Void, nfsops_types::portmap::pmaplist>(PMAP_PROG::PMAPPROC_DUMP, &Void)
            .await?;
        Ok(list.into_inner())
    }

    async fn call<A: Pack, R: Unpack>(&mut self, proc: PMAP_PROG, args: &A) -> Result<R, Error> {
        tracing::debug!(proc = proc.name(), "portmap call");
        self.rpc
            .call::<A, R>(proc as u32, args, &CallOptions::default())
            .await
    }
}
