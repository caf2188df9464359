use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// An error occurred while reading or writing data. Short reads
    /// surface here as `ErrorKind::UnexpectedEof`.
    Io(std::io::Error),

    /// A wire value did not match any variant of a closed enum or bool.
    InvalidEnumValue(u32),

    /// A union discriminator selected no legal arm.
    InvalidDiscriminant(i32),

    /// A list continuation marker was neither 0 nor 1.
    InvalidListMarker(u32),

    /// The object is too large to express on the wire.
    ObjectTooLarge(usize),

    /// A bounded opaque exceeded its protocol limit.
    TooLong { limit: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::InvalidEnumValue(v) => write!(f, "invalid enum value {v}"),
            Self::InvalidDiscriminant(v) => write!(f, "invalid union discriminant {v}"),
            Self::InvalidListMarker(v) => write!(f, "invalid list marker {v}"),
            Self::ObjectTooLarge(len) => write!(f, "object of {len} bytes is too large"),
            Self::TooLong { limit, len } => write!(f, "{len} bytes exceeds the limit of {limit}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
