mod dense_block;
mod sparse_block;

pub use dense_block::DenseKernelBlock;
pub use sparse_block::SparseKernelBlock;
