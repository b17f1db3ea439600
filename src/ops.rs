//! Projection primitives shared by the model heads.
//!
//! The DRAW heads are all built from two learned transforms: a dense affine
//! map and a same-padded strided convolution. Both use small-variance normal
//! weights and exactly-zero biases, which keeps every head's output at zero
//! until training moves it; the first canvas update starts from nothing
//! rather than from initializer noise.

use burn::module::Param;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Initializer, Linear, LinearConfig, PaddingConfig2d};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Standard deviation for projection weight initialization.
const WEIGHT_STD: f64 = 1e-3;

/// Learned affine transformation `x·W + b` for rank-2 inputs
/// `[batch, input_dim]`.
pub fn affine<B: Backend>(input_dim: usize, output_dim: usize, device: &B::Device) -> Linear<B> {
    let mut linear = LinearConfig::new(input_dim, output_dim)
        .with_initializer(Initializer::Normal {
            mean: 0.0,
            std: WEIGHT_STD,
        })
        .init(device);
    linear.bias = Some(Param::from_tensor(Tensor::zeros([output_dim], device)));
    linear
}

/// Learned same-padded convolution for rank-4 inputs `[batch, channels, H, W]`.
///
/// `scale > 1` strides the kernel, dividing the spatial resolution by `scale`.
/// `filter_dim` must be odd so half-kernel padding reproduces same-padding at
/// both stride 1 and stride 2 on even inputs.
pub fn conv_projection<B: Backend>(
    in_channels: usize,
    n_filters: usize,
    filter_dim: usize,
    scale: usize,
    device: &B::Device,
) -> Conv2d<B> {
    assert!(filter_dim % 2 == 1, "filter_dim must be odd, got {filter_dim}");
    let pad = filter_dim / 2;
    let mut conv = Conv2dConfig::new([in_channels, n_filters], [filter_dim, filter_dim])
        .with_stride([scale, scale])
        .with_padding(PaddingConfig2d::Explicit(pad, pad))
        .with_initializer(Initializer::Normal {
            mean: 0.0,
            std: WEIGHT_STD,
        })
        .init(device);
    conv.bias = Some(Param::from_tensor(Tensor::zeros([n_filters], device)));
    conv
}

/// Rearrange channel depth into spatial resolution.
///
/// Input `[batch, channels·block², H, W]` becomes
/// `[batch, channels, H·block, W·block]`; each group of `block²` input
/// channels fills one `block × block` output tile.
pub fn depth_to_space<B: Backend>(x: Tensor<B, 4>, block: usize) -> Tensor<B, 4> {
    let [batch, channels, height, width] = x.dims();
    assert!(
        channels % (block * block) == 0,
        "depth_to_space requires channels divisible by block^2, got {channels} with block {block}"
    );
    let out_channels = channels / (block * block);

    let x = x.reshape([batch, block, block, out_channels, height, width]);
    let x = x.permute([0, 3, 4, 1, 5, 2]);
    x.reshape([batch, out_channels, height * block, width * block])
}
