mod constant;
mod random;
mod spec;
mod weight_gen;

pub use constant::ConstWeightGen;
pub use random::RandWeightGen;
pub use spec::WeightInitSpec;
pub use weight_gen::WeightGen;
