mod adagrad;
mod error;

pub use adagrad::{AdaGrad, AdaGradVariant, WeightInitSpec};
pub use error::{ConfigErr, Result};
