use super::WeightGen;

/// A weight generator that always generates the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstWeightGen {
    value: f32,
}

impl ConstWeightGen {
    /// Creates a new `ConstWeightGen` weight generator.
    ///
    /// # Arguments
    /// * `value` - The value to always generate.
    ///
    /// # Returns
    /// A new `ConstWeightGen` instance.
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl WeightGen for ConstWeightGen {
    fn fill(&mut self, out: &mut [f32]) {
        out.fill(self.value);
    }
}
