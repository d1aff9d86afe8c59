pub mod codec;
pub mod initialization;
pub mod optimization;
pub mod parameters;
pub mod storage;

pub use codec::{DecodeErr, Serialize, TokenReader};
pub use optimization::{AdaGrad, AdaGradVariant, ConfigErr};
pub use parameters::{DenseAdaGradValue, ParamErr, SparseAdaGradValue, SparseGradInfo};
pub use storage::{DenseKernelBlock, SparseKernelBlock};
