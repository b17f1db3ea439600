//! Model and training configuration.
//!
//! The reference hyperparameters (CIFAR-10 sized images, 32 refinement steps)
//! are the defaults; everything the model depends on is adjustable here.
//! Spatial dimensions must be even because the read path halves them with a
//! stride-2 convolution.

use burn::config::Config;
use thiserror::Error;

/// Configuration errors, surfaced before any model is built.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("image dimensions must be even for the stride-2 read path, got {width}x{height}")]
    OddSpatialDims { width: usize, height: usize },
    #[error("sequence length (steps) must be at least 1")]
    ZeroSteps,
    #[error("channel counts must be nonzero (image {image}, latent {latent}, encoder {encoder}, decoder {decoder})")]
    ZeroChannels {
        image: usize,
        latent: usize,
        encoder: usize,
        decoder: usize,
    },
}

/// Hyperparameters for the Convolutional DRAW model and its training loop.
#[derive(Config, Debug)]
pub struct DrawConfig {
    /// Image width (A).
    #[config(default = 32)]
    pub image_width: usize,
    /// Image height (B).
    #[config(default = 32)]
    pub image_height: usize,
    /// Channels in the input images.
    #[config(default = 3)]
    pub image_channels: usize,
    /// Channels in the latent variable maps.
    #[config(default = 12)]
    pub latent_channels: usize,
    /// Channels in the encoder hidden state.
    #[config(default = 320)]
    pub encoder_channels: usize,
    /// Channels in the decoder hidden state.
    #[config(default = 320)]
    pub decoder_channels: usize,
    /// Generation sequence length (T).
    #[config(default = 32)]
    pub steps: usize,
    /// Training minibatch size.
    #[config(default = 32)]
    pub batch_size: usize,
    /// Number of training iterations.
    #[config(default = 10000)]
    pub train_iters: usize,
    /// Adam learning rate.
    #[config(default = 1e-4)]
    pub learning_rate: f64,
    /// Epsilon added to the reconstruction log-density denominator.
    #[config(default = 1e-5)]
    pub eps: f64,
}

impl DrawConfig {
    /// Channels in the canvas: a mean map and a log-scale map per image channel.
    pub fn canvas_channels(&self) -> usize {
        2 * self.image_channels
    }

    /// Check the preconditions the model relies on.
    ///
    /// Shape problems are configuration errors, not runtime ones, so they are
    /// caught here rather than letting a strided op fail mid-step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_width % 2 != 0 || self.image_height % 2 != 0 {
            return Err(ConfigError::OddSpatialDims {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if self.steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        if self.image_channels == 0
            || self.latent_channels == 0
            || self.encoder_channels == 0
            || self.decoder_channels == 0
        {
            return Err(ConfigError::ZeroChannels {
                image: self.image_channels,
                latent: self.latent_channels,
                encoder: self.encoder_channels,
                decoder: self.decoder_channels,
            });
        }
        Ok(())
    }
}
