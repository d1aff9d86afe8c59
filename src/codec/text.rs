use std::io::{self, BufRead, Write};

use super::{DecodeErr, Result, TokenReader};
use crate::parameters::{DenseAdaGradValue, SparseAdaGradValue};

/// Writes the full state of a value as text.
pub trait Serialize {
    /// Encodes `self` into `w`, always ending with a newline.
    ///
    /// # Arguments
    /// * `w` - The writer to encode into.
    ///
    /// # Returns
    /// An io error if the writer fails.
    fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()>;
}

/// One line per component: `weight d2sum g2sum momentum`.
impl Serialize for DenseAdaGradValue {
    fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let [weight, d2sum, g2sum, momentum] = self.parts();

        let rows = weight.iter().zip(d2sum).zip(g2sum).zip(momentum);
        for (((weight, d2sum), g2sum), momentum) in rows {
            writeln!(w, "{weight}\t{d2sum}\t{g2sum}\t{momentum}")?;
        }

        Ok(())
    }
}

/// A single line: `dim show g2sum weight_0 .. weight_{dim-1}`.
impl Serialize for SparseAdaGradValue {
    fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{}\t{}\t{}", self.dim(), self.show(), self.g2sum())?;

        for weight in self.weight() {
            write!(w, "\t{weight}")?;
        }

        writeln!(w)
    }
}

/// Decodes a dense value of `dim` components.
///
/// The encoding doesn't carry the dimension, the owning container knows it.
///
/// # Arguments
/// * `reader` - The token stream.
/// * `dim` - The amount of components to read.
///
/// # Returns
/// The decoded value or a `DecodeErr` if the stream is malformed or truncated.
pub fn deserialize_dense<R: BufRead>(
    reader: &mut TokenReader<R>,
    dim: usize,
) -> Result<DenseAdaGradValue> {
    let mut value = DenseAdaGradValue::zeroed(dim).map_err(|_| DecodeErr::InvalidDim(dim))?;
    let [weight, d2sum, g2sum, momentum] = value.parts_mut();

    let rows = weight
        .iter_mut()
        .zip(d2sum.iter_mut())
        .zip(g2sum.iter_mut())
        .zip(momentum.iter_mut());

    for (((weight, d2sum), g2sum), momentum) in rows {
        *weight = reader.parse("weight")?;
        *d2sum = reader.parse("d2sum")?;
        *g2sum = reader.parse("g2sum")?;
        *momentum = reader.parse("momentum")?;
    }

    Ok(value)
}

/// Decodes a sparse value.
///
/// The dimension is read first and the row is allocated for it before the rest of
/// the fields are filled in. Dimensions above `MAX_SPARSE_DIM` are rejected before
/// allocating anything.
///
/// # Arguments
/// * `reader` - The token stream.
///
/// # Returns
/// The decoded value or a `DecodeErr` if the stream is malformed or truncated.
pub fn deserialize_sparse<R: BufRead>(reader: &mut TokenReader<R>) -> Result<SparseAdaGradValue> {
    let dim: u32 = reader.parse("dim")?;
    let dim = dim as usize;
    let Ok(mut value) = SparseAdaGradValue::alloc(dim) else {
        return Err(DecodeErr::InvalidDim(dim));
    };

    let show = reader.parse("show")?;
    let g2sum = reader.parse("g2sum")?;
    value.set_stats(show, g2sum);

    for w in value.weight_mut() {
        *w = reader.parse("weight")?;
    }

    Ok(value)
}
