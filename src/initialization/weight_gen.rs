/// A `WeightGen` generates values for the initial state of a parameter's weights.
pub trait WeightGen {
    /// Overwrites every slot of `out` with a newly generated weight.
    ///
    /// # Arguments
    /// * `out` - The weights to initialize.
    fn fill(&mut self, out: &mut [f32]);
}
