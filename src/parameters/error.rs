use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::optimization::ConfigErr;

/// The specific result type for constructing and updating parameter values.
pub type Result<T> = std::result::Result<T, ParamErr>;

/// Error returned by the dense and sparse values whenever a request can't be honored.
///
/// Every variant is recoverable, the value that returned it is left unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamErr {
    /// The requested dimension can't back a parameter.
    InvalidDim(usize),
    /// A gradient or weight buffer doesn't match the parameter's dimension.
    SizeMismatch { expected: usize, got: usize },
    /// The weights of a row of this dimension couldn't be allocated.
    Alloc(usize),
    /// The show count of a pushed gradient is negative or not finite.
    InvalidShow(f32),
    /// The optimizer configuration couldn't initialize the weights.
    Config(ConfigErr),
}

impl From<ConfigErr> for ParamErr {
    fn from(value: ConfigErr) -> Self {
        Self::Config(value)
    }
}

impl Display for ParamErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDim(dim) => write!(f, "invalid parameter dimension: {dim}"),
            Self::SizeMismatch { expected, got } => write!(
                f,
                "the provided buffer length ({got}) doesn't match the parameter size ({expected})"
            ),
            Self::Alloc(dim) => write!(f, "couldn't allocate a parameter of dimension {dim}"),
            Self::InvalidShow(show) => write!(f, "invalid batch show count: {show}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ParamErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}
