//! End-to-end behavior of the unrolled DRAW model.

use burn::backend::NdArray;
use burn::module::{Module, ModuleMapper, ParamId};
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};

use convdraw::prelude::*;

type TestBackend = NdArray<f32>;

/// Replaces every learned parameter with zeros.
struct Zeroizer;

impl<B: Backend> ModuleMapper<B> for Zeroizer {
    fn map_float<const D: usize>(&mut self, _id: ParamId, tensor: Tensor<B, D>) -> Tensor<B, D> {
        tensor.zeros_like()
    }
}

fn small_config() -> DrawConfig {
    DrawConfig::new()
        .with_image_width(8)
        .with_image_height(8)
        .with_image_channels(3)
        .with_latent_channels(4)
        .with_encoder_channels(8)
        .with_decoder_channels(8)
        .with_steps(4)
}

#[test]
fn test_canvas_shape_invariant() {
    let device = Default::default();
    let model = ConvDraw::<TestBackend>::new(&small_config(), &device);

    let x = Tensor::<TestBackend, 4>::random([2, 3, 8, 8], Distribution::Uniform(0.0, 1.0), &device);
    let output = model.forward(x);

    // One canvas per timestep, every one at full resolution with mean and
    // log-scale halves.
    assert_eq!(output.canvases.len(), 4);
    for canvas in &output.canvases {
        assert_eq!(canvas.dims(), [2, 6, 8, 8]);
    }
}

#[test]
fn test_generation_sequence_layout() {
    let device = Default::default();
    let model = ConvDraw::<TestBackend>::new(&small_config(), &device);

    let x = Tensor::<TestBackend, 4>::zeros([2, 3, 8, 8], &device);
    let sequence = model.forward(x).stacked_canvases();

    // [T, batch, 2·C, H, W] for the visualization consumer.
    assert_eq!(sequence.dims(), [4, 2, 6, 8, 8]);
}

#[test]
fn test_parameter_sharing_across_timesteps() {
    // Every role resolves to the same parameter set at every timestep, so
    // the parameter count must not depend on T.
    let device = Default::default();
    let one_step = ConvDraw::<TestBackend>::new(&small_config().with_steps(1), &device);
    let many_steps = ConvDraw::<TestBackend>::new(&small_config().with_steps(32), &device);

    assert_eq!(one_step.num_params(), many_steps.num_params());
}

#[test]
fn test_gaussian_parameters_retained_per_step() {
    let device = Default::default();
    let model = ConvDraw::<TestBackend>::new(&small_config(), &device);

    let x = Tensor::<TestBackend, 4>::zeros([1, 3, 8, 8], &device);
    let output = model.forward(x);

    assert_eq!(output.mus.len(), 4);
    assert_eq!(output.logsigmas.len(), 4);
    assert_eq!(output.sigmas.len(), 4);

    for t in 0..4 {
        // Latent maps live at half the image resolution.
        assert_eq!(output.mus[t].dims(), [1, 4, 4, 4]);
        // sigma = exp(logsigma) is strictly positive everywhere.
        assert!(output.sigmas[t].clone().min().into_scalar() > 0.0);
    }
}

#[test]
fn test_zero_init_end_to_end() {
    // T = 1, batch 1, 4x4 single-channel images, all parameters zeroed:
    // every head output is zero, so the first canvas stays all-zero,
    // mu = logsigma = 0 and sigma = exp(0) = 1.
    let device = Default::default();
    let config = DrawConfig::new()
        .with_image_width(4)
        .with_image_height(4)
        .with_image_channels(1)
        .with_latent_channels(1)
        .with_encoder_channels(2)
        .with_decoder_channels(2)
        .with_steps(1);

    let model = ConvDraw::<TestBackend>::new(&config, &device).map(&mut Zeroizer);

    let x = Tensor::<TestBackend, 4>::zeros([1, 1, 4, 4], &device);
    let output = model.forward(x.clone());

    assert_eq!(output.canvases.len(), 1);
    let canvas_mass = output.canvases[0].clone().abs().sum().into_scalar();
    assert_eq!(canvas_mass, 0.0, "first canvas must be all zeros");

    let losses = draw_loss(&output, x, 1e-5);

    // Lx: mean = log_var = 0 and x = 0, so each of the 16 pixels contributes
    // exactly 0.5·ln(2π) of negative log-likelihood.
    let expected_lx = 16.0 * 0.5 * (2.0 * std::f64::consts::PI).ln();
    let lx = losses.lx.into_scalar() as f64;
    assert!(lx.is_finite());
    assert!((lx - expected_lx).abs() < 1e-3, "Lx was {lx}");

    // Lz: mu = 0, sigma = 1, logsigma = 0 with one latent channel gives
    // 0.5·1 − 0.5 = 0 at every latent position.
    let lz = losses.lz.into_scalar();
    assert!(lz.is_finite());
    assert!(lz.abs() < 1e-6, "Lz was {lz}");
}

#[test]
fn test_zero_init_canvas_threading_over_steps() {
    // With all parameters zeroed, every write-head update is zero, so each
    // canvas must equal the previous one it was built from: the whole
    // sequence stays all-zero for any T.
    let device = Default::default();
    let config = DrawConfig::new()
        .with_image_width(4)
        .with_image_height(4)
        .with_image_channels(1)
        .with_latent_channels(1)
        .with_encoder_channels(2)
        .with_decoder_channels(2)
        .with_steps(3);

    let model = ConvDraw::<TestBackend>::new(&config, &device).map(&mut Zeroizer);

    let x = Tensor::<TestBackend, 4>::zeros([1, 1, 4, 4], &device);
    let output = model.forward(x);

    assert_eq!(output.canvases.len(), 3);
    for (t, canvas) in output.canvases.iter().enumerate() {
        let mass = canvas.clone().abs().sum().into_scalar();
        assert_eq!(mass, 0.0, "canvas at step {t} must stay all zeros");
    }
}

#[test]
fn test_forward_is_stochastic_but_parameters_are_not() {
    let device = Default::default();
    let model = ConvDraw::<TestBackend>::new(&small_config(), &device);

    let x = Tensor::<TestBackend, 4>::random([1, 3, 8, 8], Distribution::Uniform(0.0, 1.0), &device);
    let a = model.forward(x.clone());
    let b = model.forward(x);

    // mu/logsigma at t = 0 depend only on parameters and x; only the noise
    // entering z (and through it, later timesteps) differs between passes.
    let mu_diff = (a.mus[0].clone() - b.mus[0].clone()).abs().max().into_scalar();
    assert!(mu_diff < 1e-6, "first-step mu must be deterministic");

    let logsigma_diff = (a.logsigmas[0].clone() - b.logsigmas[0].clone())
        .abs()
        .max()
        .into_scalar();
    assert!(logsigma_diff < 1e-6, "first-step logsigma must be deterministic");
}
