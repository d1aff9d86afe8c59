use serde::{Deserialize, Serialize};

use super::{ConfigErr, Result};
pub use crate::initialization::WeightInitSpec;

/// Selects how the squared gradients are accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaGradVariant {
    /// Plain running sum of squared gradients, `d2sum` is left untouched.
    #[default]
    Classic,
    /// Exponentially decayed sum of squared gradients normalized by a decayed
    /// update count kept in `d2sum`.
    Decayed,
}

/// The hyper-parameters of the AdaGrad optimizer.
///
/// A single instance is shared by every value of a kernel block and is passed by
/// reference into each construction and update, values never keep a copy of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaGrad {
    pub learning_rate: f32,
    pub epsilon: f32,
    pub initial_g2sum: f32,
    pub initial_show: f32,
    pub grad_decay_rate: f32,
    pub momentum: f32,
    pub show_decay_rate: f32,
    pub variant: AdaGradVariant,
    pub weight_init: WeightInitSpec,
}

impl Default for AdaGrad {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            epsilon: 1e-8,
            initial_g2sum: 0.,
            initial_show: 0.,
            grad_decay_rate: 1.,
            momentum: 0.,
            show_decay_rate: 0.98,
            variant: AdaGradVariant::Classic,
            weight_init: WeightInitSpec::Uniform {
                low: -1e-3,
                high: 1e-3,
            },
        }
    }
}

impl AdaGrad {
    /// Parses and validates an `AdaGrad` configuration from its json representation.
    ///
    /// Missing fields take their default value.
    ///
    /// # Arguments
    /// * `json` - The json document.
    ///
    /// # Returns
    /// The configuration or a `ConfigErr` if it's malformed or invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let opt: Self = serde_json::from_str(json)?;
        opt.validate()?;
        Ok(opt)
    }

    /// Checks every hyper-parameter is within its valid range.
    ///
    /// # Returns
    /// A `ConfigErr` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check(self.learning_rate > 0., "learning_rate", self.learning_rate)?;
        check(self.epsilon > 0., "epsilon", self.epsilon)?;
        check(self.initial_g2sum >= 0., "initial_g2sum", self.initial_g2sum)?;
        check(self.initial_show >= 0., "initial_show", self.initial_show)?;
        check(
            self.grad_decay_rate > 0. && self.grad_decay_rate <= 1.,
            "grad_decay_rate",
            self.grad_decay_rate,
        )?;
        check(
            (0.0..1.0).contains(&self.momentum),
            "momentum",
            self.momentum,
        )?;
        check(
            (0.0..1.0).contains(&self.show_decay_rate),
            "show_decay_rate",
            self.show_decay_rate,
        )?;

        self.weight_init.validate()
    }

    /// The factor previous accumulator values are scaled by on every update.
    pub(crate) fn accumulator_decay(&self) -> f32 {
        match self.variant {
            AdaGradVariant::Classic => 1.,
            AdaGradVariant::Decayed => self.grad_decay_rate,
        }
    }

    /// The adaptive step size for an accumulated squared gradient.
    ///
    /// `epsilon` is added before taking the square root so a zero accumulator
    /// never divides by zero.
    pub(crate) fn step_size(&self, acc: f32) -> f32 {
        self.learning_rate / (acc + self.epsilon).sqrt()
    }
}

fn check(ok: bool, field: &str, value: f32) -> Result<()> {
    if ok && value.is_finite() {
        return Ok(());
    }

    Err(ConfigErr::new(format!("invalid {field}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        AdaGrad::default().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range() {
        let cases = [
            AdaGrad {
                learning_rate: 0.,
                ..Default::default()
            },
            AdaGrad {
                epsilon: -1.,
                ..Default::default()
            },
            AdaGrad {
                grad_decay_rate: 1.5,
                ..Default::default()
            },
            AdaGrad {
                momentum: 1.,
                ..Default::default()
            },
            AdaGrad {
                show_decay_rate: 1.,
                ..Default::default()
            },
            AdaGrad {
                learning_rate: f32::NAN,
                ..Default::default()
            },
        ];

        for opt in cases {
            assert!(opt.validate().is_err(), "{opt:?} should be invalid");
        }
    }

    #[test]
    fn rejects_invalid_distribution() {
        let opt = AdaGrad {
            weight_init: WeightInitSpec::Uniform { low: 1., high: 0. },
            ..Default::default()
        };

        assert!(opt.validate().is_err());
    }

    #[test]
    fn from_json_fills_defaults() {
        let json = r#"{
            "learning_rate": 0.05,
            "variant": "decayed",
            "grad_decay_rate": 0.9,
            "weight_init": { "kind": "const", "value": 0.5 }
        }"#;

        let opt = AdaGrad::from_json(json).unwrap();

        assert_eq!(opt.learning_rate, 0.05);
        assert_eq!(opt.variant, AdaGradVariant::Decayed);
        assert_eq!(opt.weight_init, WeightInitSpec::Const { value: 0.5 });
        assert_eq!(opt.epsilon, AdaGrad::default().epsilon);
        assert_eq!(opt.show_decay_rate, 0.98);
    }

    #[test]
    fn from_json_validates() {
        assert!(AdaGrad::from_json(r#"{ "learning_rate": -1 }"#).is_err());
        assert!(AdaGrad::from_json("not json").is_err());
    }

    #[test]
    fn step_size_is_guarded_by_epsilon() {
        let opt = AdaGrad {
            learning_rate: 0.1,
            epsilon: 1e-8,
            ..Default::default()
        };

        assert!(opt.step_size(0.).is_finite());
        assert!((opt.step_size(1.) - 0.1).abs() < 1e-6);
    }
}
