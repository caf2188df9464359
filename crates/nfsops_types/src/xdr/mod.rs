//! XDR (RFC 4506) serialization: 4-byte big-endian words, everything
//! padded to a 4-byte boundary.

pub(crate) mod error;
pub(crate) mod list;
pub(crate) mod opaque;
pub(crate) mod traits;
pub(crate) mod util;
pub(crate) mod void;

/// Derive macro that implements [`Pack`] and [`Unpack`] for plain records
/// and C-like enums.
pub use nfsops_macros::XdrCodec;

pub use self::error::{Error, Result};
pub use self::list::List;
pub use self::opaque::Opaque;
pub use self::traits::{Pack, Unpack};
pub use self::util::{pack_fixed_opaque, padded_len, unpack_fixed_opaque};
pub use self::void::Void;
