use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The specific result type for decoding values from their text encoding.
pub type Result<T> = std::result::Result<T, DecodeErr>;

/// Error returned whenever a text stream can't be decoded into a value.
///
/// The value being decoded is discarded, a caller never observes a partially
/// initialized parameter.
#[derive(Debug)]
pub enum DecodeErr {
    /// The stream ended before `field` could be read.
    Truncated { field: &'static str },
    /// The token read for `field` isn't a valid number.
    InvalidToken { field: &'static str, token: String },
    /// The decoded dimension can't back a parameter.
    InvalidDim(usize),
    Io(io::Error),
}

impl From<io::Error> for DecodeErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl Display for DecodeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { field } => write!(f, "decode error: stream ended before `{field}`"),
            Self::InvalidToken { field, token } => {
                write!(f, "decode error: invalid `{field}` token {token:?}")
            }
            Self::InvalidDim(dim) => write!(f, "decode error: invalid dimension {dim}"),
            Self::Io(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl Error for DecodeErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
