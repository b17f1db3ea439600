//! Loss composition: Gaussian reconstruction log-likelihood of the final
//! canvas plus the per-timestep analytic KL divergence of the latent
//! posterior against the standard normal.
//!
//! The KL constant follows the reference arithmetic,
//! `0.5·Σ_chan(mu² + sigma² − 2·logsigma) − 0.5`, which differs from the
//! textbook closed form (the constant enters with the opposite sign there).
//! It is kept as-is for numerical compatibility with the original training
//! loop.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::model::DrawOutput;

/// Both scalar loss terms of one forward pass.
#[derive(Debug, Clone)]
pub struct DrawLosses<B: Backend> {
    /// Reconstruction term: negative Gaussian log-likelihood of the target
    /// under the final canvas, summed per example and averaged over the batch.
    pub lx: Tensor<B, 1>,
    /// Latent term: KL contributions accumulated over all T timesteps.
    pub lz: Tensor<B, 1>,
}

impl<B: Backend> DrawLosses<B> {
    /// Total training cost `Lx + Lz`.
    pub fn total(&self) -> Tensor<B, 1> {
        self.lx.clone() + self.lz.clone()
    }
}

/// Elementwise Gaussian log-density of `x` under `Normal(mean, exp(log_var/2))`:
/// `-0.5·ln(2π) - log_var/2 - (x - mean)² / (2·exp(log_var) + eps)`.
///
/// `eps` keeps the denominator away from zero when the log-variance
/// underflows.
pub fn log_normal2<B: Backend>(
    x: Tensor<B, 4>,
    mean: Tensor<B, 4>,
    log_var: Tensor<B, 4>,
    eps: f64,
) -> Tensor<B, 4> {
    let c = -0.5 * (2.0 * std::f64::consts::PI).ln();
    let denom = log_var.clone().exp().mul_scalar(2.0).add_scalar(eps);
    let squared_error = (x - mean).powf_scalar(2.0);

    squared_error
        .div(denom)
        .neg()
        .sub(log_var.div_scalar(2.0))
        .add_scalar(c)
}

/// Reconstruction term `Lx`.
///
/// Splits the final canvas into mean and log-scale halves, evaluates the
/// negative log-density of the target, sums over channel and spatial axes
/// per example, and averages over the batch.
pub fn reconstruction_loss<B: Backend>(
    final_canvas: Tensor<B, 4>,
    x: Tensor<B, 4>,
    eps: f64,
) -> Tensor<B, 1> {
    let channels = x.dims()[1];
    let mean = final_canvas.clone().narrow(1, 0, channels);
    let log_var = final_canvas.narrow(1, channels, channels);

    let nll = log_normal2(x, mean, log_var, eps).neg();
    nll.flatten::<2>(1, 3).sum_dim(1).mean()
}

/// One timestep's KL contribution,
/// `0.5·Σ_chan(mu² + sigma² − 2·logsigma) − 0.5`, shape `[batch, 1, H, W]`.
pub fn kl_term<B: Backend>(
    mu: Tensor<B, 4>,
    logsigma: Tensor<B, 4>,
    sigma: Tensor<B, 4>,
) -> Tensor<B, 4> {
    let inner = mu.powf_scalar(2.0) + sigma.powf_scalar(2.0) - logsigma.mul_scalar(2.0);
    inner.sum_dim(1).mul_scalar(0.5).sub_scalar(0.5)
}

/// Latent term `Lz`: [`kl_term`] accumulated over all timesteps, then
/// averaged over every remaining element.
pub fn kl_loss<B: Backend>(
    mus: &[Tensor<B, 4>],
    logsigmas: &[Tensor<B, 4>],
    sigmas: &[Tensor<B, 4>],
) -> Tensor<B, 1> {
    let mut total: Option<Tensor<B, 4>> = None;
    for ((mu, logsigma), sigma) in mus.iter().zip(logsigmas).zip(sigmas) {
        let kl_t = kl_term(mu.clone(), logsigma.clone(), sigma.clone());
        total = Some(match total {
            Some(acc) => acc + kl_t,
            None => kl_t,
        });
    }
    total
        .expect("kl_loss requires at least one timestep")
        .mean()
}

/// Compose both loss terms from a forward pass against its target.
pub fn draw_loss<B: Backend>(output: &DrawOutput<B>, x: Tensor<B, 4>, eps: f64) -> DrawLosses<B> {
    let lx = reconstruction_loss(output.final_canvas(), x, eps);
    let lz = kl_loss(&output.mus, &output.logsigmas, &output.sigmas);
    DrawLosses { lx, lz }
}
