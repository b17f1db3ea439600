//! Generation Demo - canvas sequence inspection
//!
//! DRAW has no separate generation pipeline: the same unrolled graph that
//! trains also produces the canvas sequence. This demo runs one forward pass
//! and shows how a visualization consumer would slice it.

use burn::backend::NdArray;
use burn::tensor::{Distribution, Tensor};
use convdraw::prelude::*;

fn main() {
    env_logger::init();

    println!("=== Convolutional DRAW Generation Demo ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    let config = DrawConfig::new()
        .with_image_width(16)
        .with_image_height(16)
        .with_image_channels(3)
        .with_latent_channels(4)
        .with_encoder_channels(16)
        .with_decoder_channels(16)
        .with_steps(6);

    let model = ConvDraw::<Backend>::new(&config, &device);

    let images = Tensor::<Backend, 4>::random(
        [2, 3, 16, 16],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    println!("Running {}-step unroll...", config.steps);
    let output = model.forward(images);

    // Full sequence: [T, batch, 2*channels, H, W].
    let sequence = output.stacked_canvases();
    println!("  Canvas sequence shape: {:?}", sequence.dims());

    // The mean half of each canvas is the reconstruction at that step.
    for (t, canvas) in output.canvases.iter().enumerate() {
        let mean = canvas.clone().narrow(1, 0, config.image_channels);
        let magnitude: f32 = mean.abs().mean().into_scalar();
        println!("  step {t}: mean-canvas magnitude {magnitude:.6}");
    }

    let reconstruction = output.final_mean();
    println!();
    println!("Final reconstruction shape: {:?}", reconstruction.dims());
    println!("(slice the mean half of each canvas to visualize refinement)");

    println!();
    println!("=== Generation Demo completed! ===");
}
