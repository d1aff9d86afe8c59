use rand::Rng;

use super::{
    ParamErr, Result, SparseGradInfo,
    layout::{self, MAX_SPARSE_DIM, WeightStore},
};
use crate::optimization::AdaGrad;

/// A sparse embedding row, lazily created the first time its feature id is seen.
///
/// Rows are kept by the millions so the header is as small as possible: a single
/// accumulator is shared by every component and low dimensional rows keep their
/// weights inline. Always size allocations with `dyn_sizeof`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseAdaGradValue {
    weights: WeightStore,
    g2sum: f32,
    dim: u32,
    show: f32,
}

impl SparseAdaGradValue {
    /// Creates a new `SparseAdaGradValue` initialized with the thread local rng.
    ///
    /// # Arguments
    /// * `dim` - The amount of weights of the row, might be zero.
    /// * `opt` - The optimizer configuration.
    ///
    /// # Returns
    /// A new instance or an error if `dim` is above `MAX_SPARSE_DIM` or the weights
    /// can't be initialized.
    pub fn new(dim: usize, opt: &AdaGrad) -> Result<Self> {
        Self::with_rng(dim, opt, &mut rand::rng())
    }

    /// Creates a new `SparseAdaGradValue` drawing the initial weights from `rng`.
    ///
    /// # Arguments
    /// * `dim` - The amount of weights of the row, might be zero.
    /// * `opt` - The optimizer configuration.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// A new instance or an error if `dim` is above `MAX_SPARSE_DIM` or the weights
    /// can't be initialized.
    pub fn with_rng<R: Rng>(dim: usize, opt: &AdaGrad, rng: &mut R) -> Result<Self> {
        let mut value = Self::alloc(dim)?;
        opt.weight_init.fill(rng, value.weight_mut())?;
        value.g2sum = opt.initial_g2sum;
        value.show = opt.initial_show;
        Ok(value)
    }

    /// Allocates a zeroed row, the storage layout is decided by `dim` alone.
    ///
    /// # Returns
    /// The row, an `InvalidDim` error if `dim` is above `MAX_SPARSE_DIM` or an
    /// `Alloc` error if the weights can't be allocated.
    pub(crate) fn alloc(dim: usize) -> Result<Self> {
        if dim > MAX_SPARSE_DIM {
            return Err(ParamErr::InvalidDim(dim));
        }

        let weights = WeightStore::alloc(dim).map_err(|_| ParamErr::Alloc(dim))?;

        Ok(Self {
            weights,
            g2sum: 0.,
            dim: dim as u32,
            show: 0.,
        })
    }

    /// Returns the exact amount of bytes a row of dimension `dim` occupies.
    pub const fn dyn_sizeof(dim: usize) -> usize {
        layout::dyn_sizeof(dim)
    }

    /// Returns whether a row of dimension `dim` keeps its weights inline.
    pub const fn is_mini_dim(dim: usize) -> bool {
        layout::is_mini_dim(dim)
    }

    pub fn dim(&self) -> usize {
        self.dim as usize
    }

    pub fn show(&self) -> f32 {
        self.show
    }

    pub fn g2sum(&self) -> f32 {
        self.g2sum
    }

    pub(crate) fn set_stats(&mut self, show: f32, g2sum: f32) {
        self.show = show;
        self.g2sum = g2sum;
    }

    pub fn weight(&self) -> &[f32] {
        self.weights.as_slice(self.dim())
    }

    pub fn weight_mut(&mut self) -> &mut [f32] {
        let dim = self.dim();
        self.weights.as_mut_slice(dim)
    }

    /// The amount of bytes this row actually occupies.
    pub fn allocated_size(&self) -> usize {
        size_of::<Self>() + self.weights.trailing_bytes()
    }

    /// Aborts if the row's storage disagrees with `dyn_sizeof`.
    ///
    /// # Panics
    /// If the allocation doesn't match the dimension, the storage is corrupted and
    /// there is no way to recover from it.
    pub fn assert_layout(&self) {
        let expected = Self::dyn_sizeof(self.dim());
        let actual = self.allocated_size();

        assert_eq!(
            actual, expected,
            "sparse row layout violated: dim={} allocated={actual} expected={expected}",
            self.dim
        );
    }

    /// Applies one AdaGrad step with the row's gradient.
    ///
    /// The squared gradient is averaged across the components and accumulated in
    /// the single shared `g2sum`, `show` grows by the batch's show count.
    ///
    /// # Arguments
    /// * `opt` - The optimizer configuration.
    /// * `grad_info` - The pushed gradient.
    ///
    /// # Returns
    /// A `SizeMismatch` error if the gradient isn't the same size as this row or an
    /// `InvalidShow` error if the batch show count is negative or not finite.
    pub fn apply(&mut self, opt: &AdaGrad, grad_info: &SparseGradInfo<'_>) -> Result<()> {
        let dim = self.dim();
        let grad = grad_info.grad;

        if grad.len() != dim {
            return Err(ParamErr::SizeMismatch {
                expected: dim,
                got: grad.len(),
            });
        }

        let batch_show = grad_info.batch_show;
        if !batch_show.is_finite() || batch_show < 0. {
            return Err(ParamErr::InvalidShow(batch_show));
        }

        self.show += batch_show;

        if dim == 0 {
            return Ok(());
        }

        let add_g2sum = grad.iter().map(|g| g * g).sum::<f32>() / dim as f32;
        self.g2sum = opt.accumulator_decay() * self.g2sum + add_g2sum;

        let step = opt.step_size(self.g2sum);
        for (w, g) in self.weight_mut().iter_mut().zip(grad) {
            *w -= step * g;
        }

        Ok(())
    }

    /// Scales `show` down to forget stale usage, never below zero.
    pub fn show_decay(&mut self, opt: &AdaGrad) {
        self.show = (self.show * opt.show_decay_rate).max(0.);
    }
}
