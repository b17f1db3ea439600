//! # Convolutional DRAW (Rust)
//!
//! Implementation of Convolutional DRAW on the Burn framework: a recurrent
//! variational model that reconstructs small color images through a sequence
//! of attention-free read/write refinement steps, each adding a stochastic
//! latent update to a running canvas.
//!
//! ## Components
//!
//! - **ConvLstmCell**: convolutional gated recurrent cell (encoder/decoder instances)
//! - **LatentSampler**: reparameterized Gaussian posterior over latent feature maps
//! - **ReadHead / WriteHead**: strided-conv downsample and depth-to-space upsample
//! - **ConvDraw**: the T-step unroll driver threading states and the canvas sequence
//! - **Loss**: Gaussian reconstruction log-likelihood plus per-step analytic KL
//! - **Trainer**: Adam updates with per-parameter gradient-norm clipping
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use convdraw::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let config = DrawConfig::new()
//!     .with_image_width(8)
//!     .with_image_height(8)
//!     .with_latent_channels(2)
//!     .with_encoder_channels(8)
//!     .with_decoder_channels(8)
//!     .with_steps(4);
//! let model = ConvDraw::<Backend>::new(&config, &device);
//!
//! let images = Tensor::<Backend, 4>::zeros([2, 3, 8, 8], &device);
//! let output = model.forward(images);
//! assert_eq!(output.canvases.len(), 4);
//! ```
//!
//! ## Training
//!
//! Training requires an autodiff backend:
//!
//! ```ignore
//! use burn::backend::{Autodiff, NdArray};
//! use convdraw::prelude::*;
//!
//! type Backend = Autodiff<NdArray<f32>>;
//! let device = Default::default();
//!
//! let config = DrawConfig::new();
//! let mut trainer = Trainer::<Backend>::new(&config, &device)?;
//! let step = trainer.step(batch); // (Lx, Lz, mean canvas) + Adam update
//! ```
//!
//! Tensors are NCHW throughout: images are `[batch, 3, H, W]`, the canvas is
//! `[batch, 6, H, W]` (mean and log-scale halves concatenated on the channel
//! axis), and latent maps live at half the image resolution.

pub mod cells;
pub mod config;
pub mod loss;
pub mod model;
pub mod ops;
pub mod train;

pub mod prelude {
    pub use crate::cells::ConvLstmCell;
    pub use crate::config::{ConfigError, DrawConfig};
    pub use crate::loss::{draw_loss, log_normal2, DrawLosses};
    pub use crate::model::{ConvDraw, DrawOutput, LatentSample, LatentSampler, ReadHead, WriteHead};
    pub use crate::train::{StepOutput, Trainer, TrainingHistory};
}
