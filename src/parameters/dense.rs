use rand::Rng;

use super::{ParamErr, Result};
use crate::optimization::{AdaGrad, AdaGradVariant};

/// A fixed size parameter, like a bias or a small weight matrix.
///
/// Every component keeps its own accumulators, all four buffers share the
/// same length and are never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseAdaGradValue {
    weight: Box<[f32]>,
    d2sum: Box<[f32]>,
    g2sum: Box<[f32]>,
    momentum: Box<[f32]>,
}

impl DenseAdaGradValue {
    /// Creates a new `DenseAdaGradValue` initialized with the thread local rng.
    ///
    /// # Arguments
    /// * `opt` - The optimizer configuration.
    /// * `dim` - The amount of components of the parameter.
    ///
    /// # Returns
    /// A new instance or an error if `dim` is zero or the weights can't be initialized.
    pub fn new(opt: &AdaGrad, dim: usize) -> Result<Self> {
        Self::with_rng(opt, dim, &mut rand::rng())
    }

    /// Creates a new `DenseAdaGradValue` drawing the initial weights from `rng`.
    ///
    /// # Arguments
    /// * `opt` - The optimizer configuration.
    /// * `dim` - The amount of components of the parameter.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// A new instance or an error if `dim` is zero or the weights can't be initialized.
    pub fn with_rng<R: Rng>(opt: &AdaGrad, dim: usize, rng: &mut R) -> Result<Self> {
        let mut value = Self::zeroed(dim)?;
        opt.weight_init.fill(rng, &mut value.weight)?;
        value.g2sum.fill(opt.initial_g2sum);
        Ok(value)
    }

    /// Allocates a value of `dim` components with every buffer set to zero.
    pub(crate) fn zeroed(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(ParamErr::InvalidDim(dim));
        }

        let buf = || vec![0.; dim].into_boxed_slice();

        Ok(Self {
            weight: buf(),
            d2sum: buf(),
            g2sum: buf(),
            momentum: buf(),
        })
    }

    pub fn dim(&self) -> usize {
        self.weight.len()
    }

    pub fn weight(&self) -> &[f32] {
        &self.weight
    }

    pub fn d2sum(&self) -> &[f32] {
        &self.d2sum
    }

    pub fn g2sum(&self) -> &[f32] {
        &self.g2sum
    }

    pub fn momentum(&self) -> &[f32] {
        &self.momentum
    }

    /// The four buffers in encoding order: weight, d2sum, g2sum and momentum.
    pub(crate) fn parts(&self) -> [&[f32]; 4] {
        [&self.weight, &self.d2sum, &self.g2sum, &self.momentum]
    }

    pub(crate) fn parts_mut(&mut self) -> [&mut [f32]; 4] {
        [
            &mut self.weight,
            &mut self.d2sum,
            &mut self.g2sum,
            &mut self.momentum,
        ]
    }

    /// Overwrites the weights with `weight`.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `weight` isn't the same size as this parameter.
    pub fn set_weight(&mut self, weight: &[f32]) -> Result<()> {
        if weight.len() != self.dim() {
            return Err(ParamErr::SizeMismatch {
                expected: self.dim(),
                got: weight.len(),
            });
        }

        self.weight.copy_from_slice(weight);
        Ok(())
    }

    /// Overwrites the weights with the native endian floats packed in `buf`.
    ///
    /// # Returns
    /// A `SizeMismatch` error, measured in bytes, if `buf` doesn't hold exactly `dim` floats.
    pub fn set_weight_bytes(&mut self, buf: &[u8]) -> Result<()> {
        const F32_SIZE: usize = size_of::<f32>();

        let expected = self.dim() * F32_SIZE;
        if buf.len() != expected {
            return Err(ParamErr::SizeMismatch {
                expected,
                got: buf.len(),
            });
        }

        // The buffer may come from the network with any alignment.
        for (w, chunk) in self.weight.iter_mut().zip(buf.chunks_exact(F32_SIZE)) {
            *w = bytemuck::pod_read_unaligned(chunk);
        }

        Ok(())
    }

    /// Applies one AdaGrad step with `grad`.
    ///
    /// A zero gradient never moves the weights, although in the decayed variant it still
    /// counts as an update for `d2sum` and the step momentum keeps converging.
    ///
    /// # Arguments
    /// * `opt` - The optimizer configuration.
    /// * `grad` - One gradient component per weight.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `grad` isn't the same size as this parameter.
    pub fn apply(&mut self, opt: &AdaGrad, grad: &[f32]) -> Result<()> {
        if grad.len() != self.dim() {
            return Err(ParamErr::SizeMismatch {
                expected: self.dim(),
                got: grad.len(),
            });
        }

        let decay = opt.accumulator_decay();
        let mu = opt.momentum;

        self.weight
            .iter_mut()
            .zip(grad)
            .zip(self.d2sum.iter_mut())
            .zip(self.g2sum.iter_mut())
            .zip(self.momentum.iter_mut())
            .for_each(|((((w, g), d2), g2), m)| {
                let acc = match opt.variant {
                    AdaGradVariant::Classic => {
                        *g2 += g * g;
                        *g2
                    }
                    AdaGradVariant::Decayed => {
                        *d2 = decay * *d2 + 1.;
                        *g2 = decay * *g2 + g * g;
                        *g2 / *d2
                    }
                };

                *m = mu * *m + (1. - mu) * opt.step_size(acc);
                *w -= *m * g;
            });

        Ok(())
    }

    /// The amount of bytes held by the four buffers.
    pub fn data_size(&self) -> usize {
        self.dim() * size_of::<f32>() * 4
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::initialization::WeightInitSpec;

    fn zero_opt(learning_rate: f32) -> AdaGrad {
        AdaGrad {
            learning_rate,
            weight_init: WeightInitSpec::Const { value: 0. },
            ..Default::default()
        }
    }

    #[test]
    fn zero_dim_is_rejected() {
        let err = DenseAdaGradValue::new(&AdaGrad::default(), 0).unwrap_err();
        assert_eq!(err, ParamErr::InvalidDim(0));
    }

    #[test]
    fn construction_follows_config() {
        let opt = AdaGrad {
            initial_g2sum: 0.1,
            weight_init: WeightInitSpec::Uniform {
                low: -0.01,
                high: 0.01,
            },
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(3);
        let value = DenseAdaGradValue::with_rng(&opt, 5, &mut rng).unwrap();

        assert_eq!(value.dim(), 5);
        assert!(value.weight().iter().all(|w| (-0.01..0.01).contains(w)));
        assert_eq!(value.g2sum(), [0.1; 5]);
        assert_eq!(value.d2sum(), [0.; 5]);
        assert_eq!(value.momentum(), [0.; 5]);
    }

    #[test]
    fn data_size() {
        let value = DenseAdaGradValue::new(&zero_opt(0.1), 10).unwrap();
        assert_eq!(value.data_size(), 10 * 4 * 4);
    }

    #[test]
    fn set_weight() {
        let mut value = DenseAdaGradValue::new(&zero_opt(0.1), 3).unwrap();

        value.set_weight(&[1., 2., 3.]).unwrap();
        assert_eq!(value.weight(), [1., 2., 3.]);

        let err = value.set_weight(&[1., 2.]).unwrap_err();
        assert_eq!(
            err,
            ParamErr::SizeMismatch {
                expected: 3,
                got: 2
            }
        );
        assert_eq!(value.weight(), [1., 2., 3.]);
    }

    #[test]
    fn set_weight_bytes() {
        let mut value = DenseAdaGradValue::new(&zero_opt(0.1), 2).unwrap();

        let mut buf = vec![0u8];
        buf.extend_from_slice(bytemuck::cast_slice(&[0.5f32, -1.5]));

        value.set_weight_bytes(&buf[1..]).unwrap();
        assert_eq!(value.weight(), [0.5, -1.5]);

        assert!(value.set_weight_bytes(&buf[..4]).is_err());
    }

    #[test]
    fn classic_step() {
        let opt = zero_opt(0.1);
        let mut value = DenseAdaGradValue::new(&opt, 2).unwrap();

        value.apply(&opt, &[1., -2.]).unwrap();

        assert_eq!(value.g2sum(), [1., 4.]);
        assert_eq!(value.d2sum(), [0., 0.]);
        assert!((value.weight()[0] + 0.1).abs() < 1e-6);
        assert!((value.weight()[1] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn decayed_step() {
        let opt = AdaGrad {
            variant: AdaGradVariant::Decayed,
            grad_decay_rate: 0.5,
            ..zero_opt(0.1)
        };
        let mut value = DenseAdaGradValue::new(&opt, 1).unwrap();

        value.apply(&opt, &[2.]).unwrap();
        assert_eq!(value.d2sum(), [1.]);
        assert_eq!(value.g2sum(), [4.]);

        value.apply(&opt, &[2.]).unwrap();
        assert_eq!(value.d2sum(), [1.5]);
        assert_eq!(value.g2sum(), [6.]);
    }

    #[test]
    fn zero_gradient_keeps_weights() {
        let opt = AdaGrad {
            momentum: 0.9,
            variant: AdaGradVariant::Decayed,
            grad_decay_rate: 0.9,
            weight_init: WeightInitSpec::Normal {
                mean: 0.,
                std_dev: 1.,
            },
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(11);
        let mut value = DenseAdaGradValue::with_rng(&opt, 4, &mut rng).unwrap();
        value.apply(&opt, &[0.3, -0.2, 0.1, 1.]).unwrap();

        let weight = value.weight().to_vec();
        value.apply(&opt, &[0.; 4]).unwrap();

        assert_eq!(value.weight(), weight);
    }

    #[test]
    fn accumulators_never_decrease() {
        let opt = AdaGrad {
            variant: AdaGradVariant::Decayed,
            grad_decay_rate: 1.,
            ..zero_opt(0.05)
        };
        let mut value = DenseAdaGradValue::new(&opt, 3).unwrap();

        for i in 1..20 {
            let prev_g2sum = value.g2sum().to_vec();
            let prev_d2sum = value.d2sum().to_vec();

            let g = i as f32 * 0.1;
            value.apply(&opt, &[g, -g, 0.5]).unwrap();

            for j in 0..3 {
                assert!(value.g2sum()[j] >= prev_g2sum[j]);
                assert!(value.d2sum()[j] >= prev_d2sum[j]);
            }
        }
    }

    #[test]
    fn momentum_smooths_step() {
        let opt = AdaGrad {
            momentum: 0.5,
            ..zero_opt(0.1)
        };
        let mut value = DenseAdaGradValue::new(&opt, 1).unwrap();

        value.apply(&opt, &[1.]).unwrap();

        // half of the full step of 0.1
        assert!((value.momentum()[0] - 0.05).abs() < 1e-6);
        assert!((value.weight()[0] + 0.05).abs() < 1e-6);
    }

    #[test]
    fn gradient_size_mismatch() {
        let opt = zero_opt(0.1);
        let mut value = DenseAdaGradValue::new(&opt, 3).unwrap();

        assert!(value.apply(&opt, &[1.; 4]).is_err());
        assert_eq!(value.g2sum(), [0.; 3]);
    }
}
