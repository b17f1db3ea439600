use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::PaddingConfig2d;
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Convolutional LSTM cell.
///
/// The gating arithmetic is the standard LSTM update with every dense map
/// replaced by a same-padded convolution:
/// - i = tanh(W_xi * x + W_hi * h)
/// - g = sigmoid(W_xg * x + W_hg * h)
/// - f = sigmoid(W_xf * x + W_hf * h + 1)
/// - o = sigmoid(W_xo * x + W_ho * h)
/// - c' = f ⊙ c + i ⊙ g
/// - h' = o ⊙ tanh(c')
///
/// `scale > 1` strides the input-to-state convolution, so the cell consumes
/// input at `scale×` its native resolution while keeping its state at the
/// native one. The encoder instance uses `scale = 2` to step down from canvas
/// space; the decoder runs at `scale = 1`.
#[derive(Module, Debug)]
pub struct ConvLstmCell<B: Backend> {
    #[module(skip)]
    input_channels: usize,
    #[module(skip)]
    hidden_channels: usize,
    #[module(skip)]
    scale: usize,
    input_map: Conv2d<B>,     // Maps input to 4 * hidden_channels (with bias)
    recurrent_map: Conv2d<B>, // Maps hidden state to 4 * hidden_channels (no bias)
}

impl<B: Backend> ConvLstmCell<B> {
    /// Create a new convolutional LSTM cell.
    ///
    /// # Arguments
    /// * `input_channels` - Channels in the input feature map
    /// * `hidden_channels` - Channels in the hidden/cell state
    /// * `filter_dim` - Spatial extent of the (square, odd) gate kernels
    /// * `scale` - Stride of the input-to-state convolution
    /// * `device` - Device to create the module on
    pub fn new(
        input_channels: usize,
        hidden_channels: usize,
        filter_dim: usize,
        scale: usize,
        device: &B::Device,
    ) -> Self {
        let pad = filter_dim / 2;
        let input_map =
            Conv2dConfig::new([input_channels, 4 * hidden_channels], [filter_dim, filter_dim])
                .with_stride([scale, scale])
                .with_padding(PaddingConfig2d::Explicit(pad, pad))
                .with_bias(true)
                .init(device);

        let recurrent_map =
            Conv2dConfig::new([hidden_channels, 4 * hidden_channels], [filter_dim, filter_dim])
                .with_padding(PaddingConfig2d::Explicit(pad, pad))
                .with_bias(false)
                .init(device);

        Self {
            input_channels,
            hidden_channels,
            scale,
            input_map,
            recurrent_map,
        }
    }

    /// Get the input channel count
    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Get the hidden channel count
    pub fn hidden_channels(&self) -> usize {
        self.hidden_channels
    }

    /// Get the input-to-state stride
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// All-zero (hidden, cell) pair at the cell's native resolution.
    ///
    /// `height`/`width` are the state's spatial dimensions, i.e. the input
    /// dimensions divided by `scale`.
    pub fn zero_state(
        &self,
        batch_size: usize,
        height: usize,
        width: usize,
        device: &B::Device,
    ) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let shape = [batch_size, self.hidden_channels, height, width];
        (Tensor::zeros(shape, device), Tensor::zeros(shape, device))
    }

    /// Perform a forward pass through the cell.
    ///
    /// # Arguments
    /// * `input` - Input map of shape `[batch, input_channels, H·scale, W·scale]`
    /// * `states` - Tuple of (hidden, cell), each of shape `[batch, hidden_channels, H, W]`
    ///
    /// # Returns
    /// Tuple of (output, (new_hidden, new_cell)); the output is the new hidden state.
    pub fn forward(
        &self,
        input: Tensor<B, 4>,
        states: (Tensor<B, 4>, Tensor<B, 4>),
    ) -> (Tensor<B, 4>, (Tensor<B, 4>, Tensor<B, 4>)) {
        let (hidden_state, cell_state) = states;

        // Combined gate pre-activations
        let input_contrib = self.input_map.forward(input);
        let recurrent_contrib = self.recurrent_map.forward(hidden_state);
        let z = input_contrib + recurrent_contrib;

        // Split into 4 gates along the channel axis
        let chunks = z.chunk(4, 1);
        let input_activation = chunks[0].clone().tanh();
        let input_gate = activation::sigmoid(chunks[1].clone());
        let forget_gate = activation::sigmoid(chunks[2].clone() + 1.0); // +1 forget-gate bias
        let output_gate = activation::sigmoid(chunks[3].clone());

        let new_cell = cell_state * forget_gate + input_activation * input_gate;
        let new_hidden = new_cell.clone().tanh() * output_gate;

        (new_hidden.clone(), (new_hidden, new_cell))
    }
}
