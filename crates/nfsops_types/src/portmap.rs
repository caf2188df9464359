#![allow(non_camel_case_types, clippy::upper_case_acronyms)]

//! Port mapper protocol (RFC 1833, version 2).

use nfsops_macros::XdrCodec;

use crate::xdr::List;

pub const PROGRAM: u32 = 100_000;
pub const VERSION: u32 = 2;
pub const PMAP_PORT: u16 = 111;

pub const IPPROTO_TCP: u32 = 6;
pub const IPPROTO_UDP: u32 = 17;

#[derive(Copy, Clone, Debug, Eq, PartialEq, XdrCodec)]
pub struct mapping {
    pub prog: u32,
    pub vers: u32,
    pub prot: u32,
    pub port: u32,
}

pub type pmaplist = List<mapping>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, XdrCodec)]
#[repr(u32)]
pub enum PMAP_PROG {
    PMAPPROC_NULL = 0,
    PMAPPROC_SET = 1,
    PMAPPROC_UNSET = 2,
    PMAPPROC_GETPORT = 3,
    PMAPPROC_DUMP = 4,
    PMAPPROC_CALLIT = 5,
}

impl PMAP_PROG {
    pub const fn name(self) -> &'static str {
        match self {
            Self::PMAPPROC_NULL => "NULL",
            Self::PMAPPROC_SET => "SET",
            Self::PMAPPROC_UNSET => "UNSET",
            Self::PMAPPROC_GETPORT => "GETPORT",
            Self::PMAPPROC_DUMP => "DUMP",
            Self::PMAPPROC_CALLIT => "CALLIT",
        }
    }
}
