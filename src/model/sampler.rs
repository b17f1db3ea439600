//! Reparameterized Gaussian latent sampler.

use burn::module::Module;
use burn::nn::conv::Conv2d;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};

use crate::ops::conv_projection;

/// One latent draw together with its distribution parameters.
///
/// `z` is consumed by the decoder; `mu`, `logsigma` and `sigma` are retained
/// for the full sequence because the KL term needs all T of them.
#[derive(Debug, Clone)]
pub struct LatentSample<B: Backend> {
    pub z: Tensor<B, 4>,
    pub mu: Tensor<B, 4>,
    pub logsigma: Tensor<B, 4>,
    pub sigma: Tensor<B, 4>,
}

/// Samples a latent feature map from encoder output via the
/// reparameterization trick: `z = mu + sigma ⊙ e` with `e ~ N(0, 1)`.
///
/// `mu` and `logsigma` are independent 5×5 convolutional heads over the
/// encoder hidden state; `sigma = exp(logsigma)` is strictly positive, which
/// keeps the downstream KL term finite.
#[derive(Module, Debug)]
pub struct LatentSampler<B: Backend> {
    mu_head: Conv2d<B>,
    logsigma_head: Conv2d<B>,
    #[module(skip)]
    latent_channels: usize,
}

impl<B: Backend> LatentSampler<B> {
    /// Create a sampler mapping `hidden_channels` encoder features to
    /// `latent_channels` latent maps.
    pub fn new(hidden_channels: usize, latent_channels: usize, device: &B::Device) -> Self {
        Self {
            mu_head: conv_projection(hidden_channels, latent_channels, 5, 1, device),
            logsigma_head: conv_projection(hidden_channels, latent_channels, 5, 1, device),
            latent_channels,
        }
    }

    /// Get the latent channel count
    pub fn latent_channels(&self) -> usize {
        self.latent_channels
    }

    /// Deterministic sampling path with injected noise.
    ///
    /// Given identical `h_enc` and identical `noise`, the result is
    /// identical; varying only `noise` changes `z` but not the distribution
    /// parameters.
    pub fn forward(&self, h_enc: Tensor<B, 4>, noise: Tensor<B, 4>) -> LatentSample<B> {
        let mu = self.mu_head.forward(h_enc.clone());
        let logsigma = self.logsigma_head.forward(h_enc);
        let sigma = logsigma.clone().exp();
        let z = mu.clone() + sigma.clone() * noise;

        LatentSample {
            z,
            mu,
            logsigma,
            sigma,
        }
    }

    /// Sampling path used by the unroll driver: draws fresh standard-normal
    /// noise shaped like the latent map, once per invocation.
    pub fn sample(&self, h_enc: Tensor<B, 4>) -> LatentSample<B> {
        let [batch_size, _, height, width] = h_enc.dims();
        let noise = Tensor::random(
            [batch_size, self.latent_channels, height, width],
            Distribution::Normal(0.0, 1.0),
            &h_enc.device(),
        );
        self.forward(h_enc, noise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_sampler_shapes() {
        let device = Default::default();
        let sampler = LatentSampler::<TestBackend>::new(32, 12, &device);

        let h_enc = Tensor::<TestBackend, 4>::zeros([4, 32, 16, 16], &device);
        let sample = sampler.sample(h_enc);

        assert_eq!(sample.z.dims(), [4, 12, 16, 16]);
        assert_eq!(sample.mu.dims(), [4, 12, 16, 16]);
        assert_eq!(sample.logsigma.dims(), [4, 12, 16, 16]);
        assert_eq!(sample.sigma.dims(), [4, 12, 16, 16]);
    }

    #[test]
    fn test_deterministic_under_fixed_noise() {
        let device = Default::default();
        let sampler = LatentSampler::<TestBackend>::new(16, 4, &device);

        let h_enc = Tensor::<TestBackend, 4>::random(
            [2, 16, 8, 8],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let noise = Tensor::<TestBackend, 4>::random(
            [2, 4, 8, 8],
            Distribution::Normal(0.0, 1.0),
            &device,
        );

        let a = sampler.forward(h_enc.clone(), noise.clone());
        let b = sampler.forward(h_enc, noise);

        assert!((a.z - b.z).abs().max().into_scalar() < 1e-7);
        assert!((a.mu - b.mu).abs().max().into_scalar() < 1e-7);
        assert!((a.logsigma - b.logsigma).abs().max().into_scalar() < 1e-7);
        assert!((a.sigma - b.sigma).abs().max().into_scalar() < 1e-7);
    }

    #[test]
    fn test_noise_only_affects_z() {
        let device = Default::default();
        let sampler = LatentSampler::<TestBackend>::new(16, 4, &device);

        let h_enc = Tensor::<TestBackend, 4>::random(
            [2, 16, 8, 8],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let noise_a = Tensor::<TestBackend, 4>::zeros([2, 4, 8, 8], &device);
        let noise_b = Tensor::<TestBackend, 4>::ones([2, 4, 8, 8], &device);

        let a = sampler.forward(h_enc.clone(), noise_a);
        let b = sampler.forward(h_enc, noise_b);

        // sigma > 0, so different noise must move z.
        assert!((a.z - b.z).abs().max().into_scalar() > 0.0);
        assert!((a.mu - b.mu).abs().max().into_scalar() < 1e-7);
        assert!((a.sigma - b.sigma).abs().max().into_scalar() < 1e-7);
    }

    #[test]
    fn test_sigma_is_positive() {
        let device = Default::default();
        let sampler = LatentSampler::<TestBackend>::new(16, 4, &device);

        let h_enc = Tensor::<TestBackend, 4>::random(
            [2, 16, 8, 8],
            Distribution::Normal(0.0, 5.0),
            &device,
        );
        let sample = sampler.sample(h_enc);

        let min_sigma = sample.sigma.min().into_scalar();
        assert!(min_sigma > 0.0, "sigma must be strictly positive");
    }

    #[test]
    fn test_zero_noise_gives_mean() {
        let device = Default::default();
        let sampler = LatentSampler::<TestBackend>::new(16, 4, &device);

        let h_enc = Tensor::<TestBackend, 4>::random(
            [1, 16, 8, 8],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let noise = Tensor::<TestBackend, 4>::zeros([1, 4, 8, 8], &device);

        let sample = sampler.forward(h_enc, noise);
        let diff = (sample.z - sample.mu).abs().max().into_scalar();
        assert!(diff < 1e-7, "z must equal mu under zero noise");
    }
}
