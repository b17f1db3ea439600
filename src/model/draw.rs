//! The Convolutional DRAW model: the T-step unroll driver.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::ConvLstmCell;
use crate::config::DrawConfig;
use crate::model::heads::{ReadHead, WriteHead};
use crate::model::sampler::LatentSampler;

/// Gate kernel size for both recurrent cells.
const CELL_FILTER_DIM: usize = 5;

/// Everything one forward pass produces.
///
/// Only the last canvas enters the reconstruction loss, but the whole
/// sequence is retained for the generation/visualization consumers; the
/// Gaussian parameter sequences feed the per-timestep KL term.
#[derive(Debug, Clone)]
pub struct DrawOutput<B: Backend> {
    /// One canvas per timestep, each `[batch, 2·C, H, W]`.
    pub canvases: Vec<Tensor<B, 4>>,
    /// Posterior means, one per timestep.
    pub mus: Vec<Tensor<B, 4>>,
    /// Posterior log-scales, one per timestep.
    pub logsigmas: Vec<Tensor<B, 4>>,
    /// Posterior scales, one per timestep.
    pub sigmas: Vec<Tensor<B, 4>>,
}

impl<B: Backend> DrawOutput<B> {
    /// The last canvas of the sequence.
    pub fn final_canvas(&self) -> Tensor<B, 4> {
        self.canvases
            .last()
            .expect("a DrawOutput holds at least one canvas")
            .clone()
    }

    /// Mean half of the last canvas: the model's reconstruction,
    /// `[batch, C, H, W]`.
    pub fn final_mean(&self) -> Tensor<B, 4> {
        let canvas = self.final_canvas();
        let channels = canvas.dims()[1] / 2;
        canvas.narrow(1, 0, channels)
    }

    /// The full canvas sequence stacked into `[T, batch, 2·C, H, W]`.
    pub fn stacked_canvases(&self) -> Tensor<B, 5> {
        Tensor::stack(self.canvases.clone(), 0)
    }
}

/// Convolutional DRAW.
///
/// At each of T timesteps the driver:
/// 1. takes the previous canvas (all-zero at t = 0),
/// 2. computes the residual `epsilon = x - mean(canvas)`,
/// 3. feeds `concat(x, epsilon)` to the encoder cell,
/// 4. samples a latent map from the encoder output,
/// 5. feeds `concat(z, read(canvas))` to the decoder cell,
/// 6. adds `write(h_dec)` onto the canvas.
///
/// Every role (encoder, decoder, read, write, mu, sigma) is a module field
/// created once in [`ConvDraw::new`]; the loop body reuses those fields at
/// every timestep, so one parameter set per role exists regardless of T.
#[derive(Module, Debug)]
pub struct ConvDraw<B: Backend> {
    encoder: ConvLstmCell<B>,
    decoder: ConvLstmCell<B>,
    sampler: LatentSampler<B>,
    read: ReadHead<B>,
    write: WriteHead<B>,
    #[module(skip)]
    steps: usize,
    #[module(skip)]
    image_channels: usize,
}

impl<B: Backend> ConvDraw<B> {
    /// Build the model for a validated configuration.
    pub fn new(config: &DrawConfig, device: &B::Device) -> Self {
        let canvas_channels = config.canvas_channels();

        // Encoder sees concat(x, epsilon) at full resolution and strides down.
        let encoder = ConvLstmCell::new(
            2 * config.image_channels,
            config.encoder_channels,
            CELL_FILTER_DIM,
            2,
            device,
        );
        // Decoder sees concat(z, read(canvas)) already at half resolution.
        let decoder = ConvLstmCell::new(
            config.latent_channels + canvas_channels,
            config.decoder_channels,
            CELL_FILTER_DIM,
            1,
            device,
        );

        Self {
            encoder,
            decoder,
            sampler: LatentSampler::new(config.encoder_channels, config.latent_channels, device),
            read: ReadHead::new(canvas_channels, device),
            write: WriteHead::new(config.decoder_channels, canvas_channels, device),
            steps: config.steps,
            image_channels: config.image_channels,
        }
    }

    /// Get the sequence length T
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run the full T-step unroll on a batch of images `[batch, C, H, W]`
    /// with values in `[0, 1]`.
    ///
    /// Fresh standard-normal noise is drawn per timestep inside the sampler;
    /// everything else is a pure function of the parameters and `x`.
    pub fn forward(&self, x: Tensor<B, 4>) -> DrawOutput<B> {
        let [batch_size, _, height, width] = x.dims();
        let device = x.device();
        let canvas_channels = 2 * self.image_channels;

        let mut enc_state = self
            .encoder
            .zero_state(batch_size, height / 2, width / 2, &device);
        let mut dec_state = self
            .decoder
            .zero_state(batch_size, height / 2, width / 2, &device);

        let mut canvases: Vec<Tensor<B, 4>> = Vec::with_capacity(self.steps);
        let mut mus = Vec::with_capacity(self.steps);
        let mut logsigmas = Vec::with_capacity(self.steps);
        let mut sigmas = Vec::with_capacity(self.steps);

        for t in 0..self.steps {
            let r_prev = if t == 0 {
                Tensor::zeros([batch_size, canvas_channels, height, width], &device)
            } else {
                canvases[t - 1].clone()
            };

            // Residual of the target against the current mean estimate.
            let mean = r_prev.clone().narrow(1, 0, self.image_channels);
            let epsilon = x.clone() - mean;

            let (h_enc, new_enc_state) = self
                .encoder
                .forward(Tensor::cat(vec![x.clone(), epsilon], 1), enc_state);
            enc_state = new_enc_state;

            let latent = self.sampler.sample(h_enc);

            let r_down = self.read.forward(r_prev.clone());
            let (h_dec, new_dec_state) = self
                .decoder
                .forward(Tensor::cat(vec![latent.z, r_down], 1), dec_state);
            dec_state = new_dec_state;

            canvases.push(r_prev + self.write.forward(h_dec));
            mus.push(latent.mu);
            logsigmas.push(latent.logsigma);
            sigmas.push(latent.sigma);
        }

        DrawOutput {
            canvases,
            mus,
            logsigmas,
            sigmas,
        }
    }
}
