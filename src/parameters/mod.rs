mod dense;
mod error;
mod grad;
mod layout;
mod sparse;

pub use dense::DenseAdaGradValue;
pub use error::{ParamErr, Result};
pub use grad::SparseGradInfo;
pub use layout::{MAX_SPARSE_DIM, dyn_sizeof, is_mini_dim};
pub use sparse::SparseAdaGradValue;
