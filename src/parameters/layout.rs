use std::collections::TryReserveError;

use super::SparseAdaGradValue;

/// Rows below this dimension keep their weights inline in the header.
const MINI_DIM_LIMIT: usize = 2;

/// The largest dimension a sparse row can be allocated with.
pub const MAX_SPARSE_DIM: usize = 1 << 16;

/// Returns whether a sparse row of dimension `dim` stores its weights inline.
pub const fn is_mini_dim(dim: usize) -> bool {
    dim < MINI_DIM_LIMIT
}

/// Returns the exact amount of bytes a sparse row of dimension `dim` occupies,
/// the fixed header plus the trailing weight buffer when there is one.
pub const fn dyn_sizeof(dim: usize) -> usize {
    let trailing = if is_mini_dim(dim) {
        0
    } else {
        dim * size_of::<f32>()
    };

    size_of::<SparseAdaGradValue>() + trailing
}

/// The storage of a sparse row's weights.
///
/// Low dimensional rows, by far the most common ones, fit inside the header and
/// avoid a second allocation. Every other row owns a buffer of exactly `dim` floats.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum WeightStore {
    Inline([f32; MINI_DIM_LIMIT - 1]),
    Trailing(Box<[f32]>),
}

impl WeightStore {
    /// Allocates zeroed storage for `dim` weights.
    ///
    /// # Returns
    /// The storage or an error if the trailing buffer can't be allocated.
    pub fn alloc(dim: usize) -> Result<Self, TryReserveError> {
        if is_mini_dim(dim) {
            return Ok(Self::Inline([0.; MINI_DIM_LIMIT - 1]));
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(dim)?;
        buf.resize(dim, 0.);
        Ok(Self::Trailing(buf.into_boxed_slice()))
    }

    pub fn as_slice(&self, dim: usize) -> &[f32] {
        match self {
            Self::Inline(v) => &v[..dim],
            Self::Trailing(p) => p,
        }
    }

    pub fn as_mut_slice(&mut self, dim: usize) -> &mut [f32] {
        match self {
            Self::Inline(v) => &mut v[..dim],
            Self::Trailing(p) => p,
        }
    }

    /// The amount of bytes allocated outside of the header.
    pub fn trailing_bytes(&self) -> usize {
        match self {
            Self::Inline(_) => 0,
            Self::Trailing(p) => p.len() * size_of::<f32>(),
        }
    }
}
