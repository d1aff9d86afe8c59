use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use log::debug;
use parking_lot::RwLock;

use crate::{
    codec::{self, Serialize, TokenReader},
    optimization::AdaGrad,
    parameters::{DenseAdaGradValue, ParamErr, Result},
};

/// Holds a dense parameter and serializes every access to it.
///
/// Readers pulling the weights share the lock, updates take it exclusively.
#[derive(Debug)]
pub struct DenseKernelBlock {
    opt: Arc<AdaGrad>,
    value: RwLock<DenseAdaGradValue>,
}

impl DenseKernelBlock {
    /// Creates a new `DenseKernelBlock`.
    ///
    /// # Arguments
    /// * `opt` - The optimizer configuration shared with the rest of the blocks.
    /// * `dim` - The amount of components of the parameter.
    ///
    /// # Returns
    /// A new instance or an error if the value can't be created.
    pub fn new(opt: Arc<AdaGrad>, dim: usize) -> Result<Self> {
        let value = DenseAdaGradValue::new(&opt, dim)?;
        debug!(dim = dim; "created dense block");

        Ok(Self {
            opt,
            value: RwLock::new(value),
        })
    }

    pub fn dim(&self) -> usize {
        self.value.read().dim()
    }

    /// The amount of bytes held by the block's parameter.
    pub fn data_size(&self) -> usize {
        self.value.read().data_size()
    }

    /// Applies a gradient to the parameter.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `grad` isn't the same size as the parameter.
    pub fn apply(&self, grad: &[f32]) -> Result<()> {
        self.value.write().apply(&self.opt, grad)
    }

    /// Copies the parameter's weights into the provided destination buffer.
    ///
    /// # Arguments
    /// * `out` - A mutable slice where the weights will be copied.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `out` isn't the same size as the parameter.
    pub fn pull_weights(&self, out: &mut [f32]) -> Result<()> {
        let value = self.value.read();
        let weight = value.weight();

        if weight.len() != out.len() {
            return Err(ParamErr::SizeMismatch {
                expected: weight.len(),
                got: out.len(),
            });
        }

        out.copy_from_slice(weight);
        Ok(())
    }

    /// Overwrites the weights with the raw floats received in `buf`.
    pub fn set_weights(&self, buf: &[u8]) -> Result<()> {
        self.value.write().set_weight_bytes(buf)
    }

    /// Writes the parameter's text encoding into `w`.
    pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.value.read().serialize(w)
    }

    /// Replaces the parameter with the one decoded from `reader`.
    ///
    /// The current parameter is kept if decoding fails.
    pub fn deserialize<R: BufRead>(&self, reader: &mut TokenReader<R>) -> codec::Result<()> {
        let decoded = codec::deserialize_dense(reader, self.dim())?;
        *self.value.write() = decoded;
        Ok(())
    }
}
