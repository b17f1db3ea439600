//! Training Demo - Convolutional DRAW on random data
//!
//! Runs a handful of optimization steps on synthetic images to show the full
//! train loop: forward unroll, loss, clipped Adam update, history recording.
//! Swap the random batches for a real dataset loader to train for real.

use burn::backend::{Autodiff, NdArray};
use burn::tensor::{Distribution, Tensor};
use convdraw::prelude::*;

fn main() {
    env_logger::init();

    println!("=== Convolutional DRAW Training Demo ===\n");

    type Backend = Autodiff<NdArray<f32>>;
    let device = Default::default();

    // Scaled-down model so the demo runs quickly on CPU. The defaults
    // (32x32x3 images, 32 steps, 320 hidden channels) are the reference
    // CIFAR-10 configuration.
    let config = DrawConfig::new()
        .with_image_width(16)
        .with_image_height(16)
        .with_image_channels(3)
        .with_latent_channels(4)
        .with_encoder_channels(16)
        .with_decoder_channels(16)
        .with_steps(4)
        .with_batch_size(4)
        .with_train_iters(20);

    println!("Training setup:");
    println!(
        "  Images: {}x{}x{}",
        config.image_width, config.image_height, config.image_channels
    );
    println!("  Refinement steps: {}", config.steps);
    println!("  Batch size: {}", config.batch_size);
    println!("  Learning rate: {}", config.learning_rate);
    println!();

    let mut trainer =
        Trainer::<Backend>::new(&config, &device).expect("demo configuration is valid");
    let mut history = TrainingHistory::new();

    for i in 0..config.train_iters {
        // Stand-in for a dataset minibatch, values already in [0, 1].
        let batch = Tensor::<Backend, 4>::random(
            [
                config.batch_size,
                config.image_channels,
                config.image_height,
                config.image_width,
            ],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );

        let step = trainer.step(batch);
        history.record(step.lx, step.lz);

        if i % 5 == 0 {
            println!("iter={} : Lx: {:.4} Lz: {:.4}", i, step.lx, step.lz);
        }
    }

    println!();
    println!("Recorded {} iterations of (Lx, Lz).", history.len());

    let json = serde_json::to_string(&history).expect("history serializes");
    std::fs::write("draw_history.json", json).expect("can write history file");
    println!("Loss history saved to draw_history.json");

    println!();
    println!("=== Training Demo completed! ===");
    println!("\nNext steps:");
    println!("  - Replace the random batches with a real image loader");
    println!("  - Scale the config back up to the CIFAR-10 defaults");
    println!("  - Checkpoint trainer.into_model() with Burn's record API");
}
