/// The gradient pushed for a single sparse row.
#[derive(Debug, Clone, Copy)]
pub struct SparseGradInfo<'a> {
    /// One gradient component per weight of the row.
    pub grad: &'a [f32],
    /// How many times the row was shown in the batch that produced `grad`, must be
    /// finite and non negative.
    pub batch_show: f32,
}

impl<'a> SparseGradInfo<'a> {
    /// Creates a new `SparseGradInfo`.
    ///
    /// # Arguments
    /// * `grad` - One gradient component per weight of the row.
    /// * `batch_show` - How many times the row was shown in the batch.
    ///
    /// # Returns
    /// A new `SparseGradInfo` instance.
    pub fn new(grad: &'a [f32], batch_show: f32) -> Self {
        Self { grad, batch_show }
    }
}
