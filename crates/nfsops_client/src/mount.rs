//! MOUNT3 client. Uses an AUTH_UNIX credential and, when asked,
//! a reserved local port -- some filers only honor mounts from
//! privileged ports.

use std::net::IpAddr;

use nfsops_types::mount::{
    MOUNT_PROGRAM, PROGRAM, VERSION, dirpath, exports, fhandle3, mountlist, mountres3,
    mountres3_ok,
};
use nfsops_types::xdr::{Pack, Unpack, Void};

use crate::auth::CredFlavor;
use crate::error::Error;
use crate::net::Connector;
use crate::portmapper::PortmapperClient;
use crate::rpc::{BindOptions, CallOptions, RpcClient};

#[derive(Debug, Clone, Copy, Default)]
pub struct MountOptions {
    /// Bind the local end to a port below 1024.
    pub reserved_port: bool,
    pub bind_addr: Option<IpAddr>,
}

pub struct MountClient<C: Connector> {
    rpc: RpcClient<C>,
}

impl<C: Connector + Clone> MountClient<C> {
    /// Resolves the MOUNT3 port through the portmapper, then builds a
    /// client for it.
    pub async fn connect(connector: C, host: &str) -> Result<Self, Error> {
        Self::connect_with(connector, host, MountOptions::default()).await
    }

    pub async fn connect_with(
        connector: C,
        host: &str,
        options: MountOptions,
    ) -> Result<Self, Error> {
        let mut portmapper = PortmapperClient::new(connector.clone(), host);
        let port = portmapper.getport(PROGRAM, VERSION).await?;
        Ok(Self::to_port(connector, host, port, options))
    }
}

impl<C: Connector> MountClient<C> {
    /// Builds a client for a known port, skipping the portmapper.
    pub fn to_port(connector: C, host: &str, port: u16, options: MountOptions) -> Self {
        let rpc = RpcClient::new(connector, host, port, PROGRAM, VERSION)
            .with_cred_flavor(CredFlavor::Unix)
            .with_bind(BindOptions {
                reserved: options.reserved_port,
                addr: options.bind_addr,
            });
        Self { rpc }
    }

    pub async fn null(&mut self) -> Result<(), Error> {
        let Void = self.call::<Void, Void>(MOUNT_PROGRAM::MOUNTPROC3_NULL, &Void).await?;
        Ok(())
    }

    /// Mounts `path`, returning the export's root handle and the
    /// server's accepted auth flavors.
    pub async fn mnt(&mut self, path: &dirpath<'_>) -> Result<mountres3_ok, Error> {
        let res = self
            .call::<dirpath, mountres3>(MOUNT_PROGRAM::MOUNTPROC3_MNT, path)
            .await?;
        match res {
            mountres3::Ok(ok) => Ok(ok),
            mountres3::Err(status) => Err(Error::Mount(status)),
        }
    }

    /// The root handle of the `/` export.
    pub async fn root_handle(&mut self) -> Result<fhandle3, Error> {
        let res = self.mnt(&dirpath::from("/")).await?;
        Ok(res.fhandle)
    }

    pub async fn dump(&mut self) -> Result<mountlist<'static, 'static>, Error> {
        self.call::<Void, mountlist>(MOUNT_PROGRAM::MOUNTPROC3_DUMP, &Void)
            .await
    }

    pub async fn umnt(&mut self, path: &dirpath<'_>) -> Result<(), Error> {
        let Void = self
            .call::<dirpath, Void>(MOUNT_PROGRAM::MOUNTPROC3_UMNT, path)
            .await?;
        Ok(())
    }

    pub async fn umntall(&mut self) -> Result<(), Error> {
        let Void = self.call::<Void, Void>(MOUNT_PROGRAM::MOUNTPROC3_UMNTALL, &Void).await?;
        Ok(())
    }

    pub async fn export(&mut self) -> Result<exports<'static, 'static>, Error> {
        self.call::<Void, exports>(MOUNT_PROGRAM::MOUNTPROC3_EXPORT, &Void)
            .await
    }

    async fn call<A: Pack, R: Unpack>(&mut self, proc: MOUNT_PROGRAM, args: &A) -> Result<R, Error> {
        tracing::debug!(proc = proc.name(), "mount call");
        self.rpc
            .call::<A, R>(proc as u32, args, &CallOptions::default())
            .await
    }
}
