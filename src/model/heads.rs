//! Canvas read/write heads.
//!
//! The model works at half the canvas resolution internally. The read head
//! halves canvas space with a stride-2 convolution; the write head doubles it
//! back by producing 4× the canvas channels and rearranging depth into a 2×2
//! spatial block. The pairing keeps canvas updates at full resolution while
//! the recurrent states stay at half.

use burn::module::Module;
use burn::nn::conv::Conv2d;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::ops::{conv_projection, depth_to_space};

/// Downsamples the running canvas for decoder consumption:
/// 3×3 same-padded convolution with stride 2.
#[derive(Module, Debug)]
pub struct ReadHead<B: Backend> {
    conv: Conv2d<B>,
}

impl<B: Backend> ReadHead<B> {
    /// `canvas_channels` in, `canvas_channels` out, at half resolution.
    pub fn new(canvas_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: conv_projection(canvas_channels, canvas_channels, 3, 2, device),
        }
    }

    /// `[batch, C, H, W]` -> `[batch, C, H/2, W/2]`
    pub fn forward(&self, canvas: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv.forward(canvas)
    }
}

/// Upsamples decoder output back into canvas space: 5×5 convolution to
/// 4×`canvas_channels`, then a block-2 depth-to-space rearrangement.
#[derive(Module, Debug)]
pub struct WriteHead<B: Backend> {
    conv: Conv2d<B>,
}

impl<B: Backend> WriteHead<B> {
    /// `decoder_channels` in at half resolution, `canvas_channels` out at
    /// full resolution.
    pub fn new(decoder_channels: usize, canvas_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: conv_projection(decoder_channels, canvas_channels * 4, 5, 1, device),
        }
    }

    /// `[batch, D, H/2, W/2]` -> `[batch, C, H, W]`
    pub fn forward(&self, h_dec: Tensor<B, 4>) -> Tensor<B, 4> {
        depth_to_space(self.conv.forward(h_dec), 2)
    }
}
