use std::{
    collections::{HashMap, hash_map::Entry},
    io::{self, BufRead, Write},
    num::NonZeroUsize,
    sync::Arc,
};

use log::{debug, info, warn};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::{
    codec::{self, DecodeErr, Serialize, TokenReader},
    optimization::AdaGrad,
    parameters::{ParamErr, Result, SparseAdaGradValue, SparseGradInfo},
};

type Shard = Mutex<HashMap<u64, SparseAdaGradValue>>;

/// Holds the sparse rows of an embedding keyed by their feature sign.
///
/// Rows are partitioned in shards, each behind its own lock, so rows living in
/// different shards are updated fully in parallel.
#[derive(Debug)]
pub struct SparseKernelBlock {
    opt: Arc<AdaGrad>,
    shards: Box<[Shard]>,
}

impl SparseKernelBlock {
    /// Creates a new empty `SparseKernelBlock`.
    ///
    /// # Arguments
    /// * `opt` - The optimizer configuration shared with the rest of the blocks.
    /// * `shard_amount` - The amount of independently locked shards.
    ///
    /// # Returns
    /// A new `SparseKernelBlock` instance.
    pub fn new(opt: Arc<AdaGrad>, shard_amount: NonZeroUsize) -> Self {
        let shards = (0..shard_amount.get())
            .map(|_| Mutex::new(HashMap::new()))
            .collect();

        Self { opt, shards }
    }

    fn shard(&self, sign: u64) -> &Shard {
        &self.shards[(sign % self.shards.len() as u64) as usize]
    }

    /// Returns the amount of rows in the block.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the row stored under `sign`.
    pub fn row(&self, sign: u64) -> Option<SparseAdaGradValue> {
        self.shard(sign).lock().get(&sign).cloned()
    }

    /// Copies the weights of the row `sign` into `out`, creating the row first if
    /// it was never seen.
    ///
    /// # Arguments
    /// * `sign` - The feature sign of the row.
    /// * `dim` - The dimension of the row.
    /// * `out` - A mutable slice where the weights will be copied.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `out` or an already existing row have a dimension
    /// other than `dim`.
    pub fn pull(&self, sign: u64, dim: usize, out: &mut [f32]) -> Result<()> {
        if out.len() != dim {
            return Err(ParamErr::SizeMismatch {
                expected: dim,
                got: out.len(),
            });
        }

        let mut shard = self.shard(sign).lock();

        let value = match shard.entry(sign) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let value = SparseAdaGradValue::new(dim, &self.opt)?;
                debug!(sign = sign, dim = dim; "created sparse row");
                entry.insert(value)
            }
        };

        if value.dim() != dim {
            return Err(ParamErr::SizeMismatch {
                expected: value.dim(),
                got: dim,
            });
        }

        out.copy_from_slice(value.weight());
        Ok(())
    }

    /// Applies a gradient to the row `sign`, creating it first if it was never seen.
    ///
    /// # Returns
    /// A `SizeMismatch` error if the gradient doesn't match the row's dimension.
    pub fn push(&self, sign: u64, grad_info: &SparseGradInfo<'_>) -> Result<()> {
        let mut shard = self.shard(sign).lock();

        let value = match shard.entry(sign) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let dim = grad_info.grad.len();
                let value = SparseAdaGradValue::new(dim, &self.opt)?;
                debug!(sign = sign, dim = dim; "created sparse row");
                entry.insert(value)
            }
        };

        value.apply(&self.opt, grad_info)
    }

    /// Applies a batch of gradients in parallel.
    ///
    /// # Returns
    /// The first `SizeMismatch` error found, the rest of the rows are still updated.
    pub fn push_batch(&self, batch: &[(u64, SparseGradInfo<'_>)]) -> Result<()> {
        let results: Vec<_> = batch
            .par_iter()
            .map(|(sign, grad_info)| self.push(*sign, grad_info))
            .collect();

        results.into_iter().collect()
    }

    /// Decays the show count of every row.
    pub fn show_decay(&self) {
        self.shards.par_iter().for_each(|shard| {
            shard
                .lock()
                .values_mut()
                .for_each(|value| value.show_decay(&self.opt));
        });

        debug!(rate = self.opt.show_decay_rate; "decayed sparse rows");
    }

    /// Drops every row shown less than `threshold` times.
    ///
    /// # Returns
    /// The amount of evicted rows.
    pub fn evict(&self, threshold: f32) -> usize {
        let evicted = self
            .shards
            .par_iter()
            .map(|shard| {
                let mut shard = shard.lock();
                let before = shard.len();
                shard.retain(|_, value| value.show() >= threshold);
                before - shard.len()
            })
            .sum::<usize>();

        debug!(threshold = threshold, evicted = evicted; "evicted sparse rows");
        evicted
    }

    /// Returns the amount of bytes occupied by every row.
    ///
    /// # Panics
    /// If any row's storage disagrees with its dimension.
    pub fn memory_usage(&self) -> usize {
        self.shards
            .par_iter()
            .map(|shard| {
                shard
                    .lock()
                    .values()
                    .map(|value| {
                        value.assert_layout();
                        SparseAdaGradValue::dyn_sizeof(value.dim())
                    })
                    .sum::<usize>()
            })
            .sum()
    }

    /// Writes every row into `w`, one `sign value` line per row.
    pub fn serialize<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for shard in self.shards.iter() {
            for (sign, value) in shard.lock().iter() {
                write!(w, "{sign}\t")?;
                value.serialize(w)?;
            }
        }

        Ok(())
    }

    /// Loads the rows written by `serialize`, overwriting rows with the same sign.
    ///
    /// Malformed lines, including the ones that aren't valid UTF-8, are logged and
    /// skipped.
    ///
    /// # Returns
    /// The amount of rows loaded or an io error if `reader` fails.
    pub fn deserialize<R: BufRead>(&self, mut reader: R) -> codec::Result<usize> {
        let mut loaded = 0;
        let mut skipped = 0;
        let mut buf = Vec::new();

        for idx in 1.. {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = idx; "skipping sparse row: {e}");
                    skipped += 1;
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match decode_row(line) {
                Ok((sign, value)) => {
                    self.shard(sign).lock().insert(sign, value);
                    loaded += 1;
                }
                Err(DecodeErr::Io(e)) => return Err(DecodeErr::Io(e)),
                Err(e) => {
                    warn!(line = idx; "skipping sparse row: {e}");
                    skipped += 1;
                }
            }
        }

        info!(loaded = loaded, skipped = skipped; "loaded sparse block");
        Ok(loaded)
    }
}

fn decode_row(line: &str) -> codec::Result<(u64, SparseAdaGradValue)> {
    let mut reader = TokenReader::new(line.as_bytes());
    let sign = reader.parse("sign")?;
    let value = codec::deserialize_sparse(&mut reader)?;

    if !reader.is_exhausted()? {
        let token = reader.next_token()?.unwrap_or_default().to_string();
        return Err(DecodeErr::InvalidToken {
            field: "end of row",
            token,
        });
    }

    Ok((sign, value))
}
