#![doc = include_str!("../README.md")]

pub mod auth;
pub mod cache;
mod connect;
pub mod error;
pub(crate) mod frame;
pub mod io;
pub mod mount;
pub mod net;
pub mod nfs;
pub mod path;
pub mod portmapper;
pub mod rpc;
pub mod stats;
pub mod tokio;

pub use connect::connect;
pub use error::{Error, PortmapError, RpcError};
pub use mount::{MountClient, MountOptions};
pub use nfs::Nfs3Client;
/// Re-export of the wire types for convenience.
pub use nfsops_types;
pub use portmapper::PortmapperClient;
pub use rpc::{CallOptions, Deadline, RpcClient};
