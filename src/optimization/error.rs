use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The specific result type for validating and resolving optimizer configurations.
pub type Result<T> = std::result::Result<T, ConfigErr>;

/// Error returned whenever an `AdaGrad` configuration holds an invalid hyper-parameter
/// or a weight distribution that can't be built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErr(String);

impl ConfigErr {
    /// Creates a new `ConfigErr` from a human readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<NormalError> for ConfigErr {
    fn from(value: NormalError) -> Self {
        Self(value.to_string())
    }
}

impl From<UniformError> for ConfigErr {
    fn from(value: UniformError) -> Self {
        Self(value.to_string())
    }
}

impl From<serde_json::Error> for ConfigErr {
    fn from(value: serde_json::Error) -> Self {
        Self(value.to_string())
    }
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdaGrad config error: {}", self.0)
    }
}

impl Error for ConfigErr {}
