use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ConstWeightGen, RandWeightGen, WeightGen};
use crate::optimization::{ConfigErr, Result};

/// Describes how the weights of a new parameter are initialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightInitSpec {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
}

impl WeightInitSpec {
    /// Checks the described distribution can actually be built.
    pub fn validate(&self) -> Result<()> {
        let mut rng = rand::rng();
        self.fill(&mut rng, &mut [])
    }

    /// Resolves this spec into a weight generator and initializes `out` with it.
    ///
    /// # Arguments
    /// * `rng` - A random number generator, untouched for constant specs.
    /// * `out` - The weights to initialize.
    ///
    /// # Returns
    /// A `ConfigErr` if the distribution parameters are invalid.
    pub fn fill<R: Rng>(&self, rng: &mut R, out: &mut [f32]) -> Result<()> {
        match *self {
            Self::Const { value } => {
                if !value.is_finite() {
                    return Err(ConfigErr::new(format!("invalid const weight: {value}")));
                }

                ConstWeightGen::new(value).fill(out);
            }
            Self::Uniform { low, high } => RandWeightGen::uniform(rng, low, high)?.fill(out),
            Self::Normal { mean, std_dev } => RandWeightGen::normal(rng, mean, std_dev)?.fill(out),
        }

        Ok(())
    }
}
