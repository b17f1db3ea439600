//! Training step: gradients of the total loss, per-parameter norm clipping,
//! and the Adam update.
//!
//! Gradients are computed against the parameter snapshot that produced the
//! forward pass; the optimizer applies every update afterwards, so a step is
//! atomic with respect to its own gradient computation. A parameter that
//! receives no gradient is reported with a warning and simply skipped; it
//! never aborts training.

use std::marker::PhantomData;

use burn::grad_clipping::GradientClippingConfig;
use burn::module::{Module, ModuleVisitor, ParamId};
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, DrawConfig};
use crate::loss::draw_loss;
use crate::model::ConvDraw;

/// Maximum gradient norm, applied per parameter before the Adam update.
pub const GRAD_CLIP_NORM: f32 = 5.0;

/// What one training step hands back to the caller.
#[derive(Debug)]
pub struct StepOutput<B: AutodiffBackend> {
    /// Reconstruction loss term.
    pub lx: f32,
    /// Latent (KL) loss term.
    pub lz: f32,
    /// Mean half of the final canvas, detached for visualization.
    pub mean_canvas: Tensor<B, 4>,
}

/// Per-iteration loss history, serializable for the caller's artifact file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub lx: Vec<f32>,
    pub lz: Vec<f32>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, lx: f32, lz: f32) {
        self.lx.push(lx);
        self.lz.push(lz);
    }

    pub fn len(&self) -> usize {
        self.lx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lx.is_empty()
    }
}

/// Owns the model and its Adam optimizer state across training steps.
pub struct Trainer<B: AutodiffBackend> {
    model: ConvDraw<B>,
    optim: OptimizerAdaptor<Adam, ConvDraw<B>, B>,
    learning_rate: f64,
    eps: f64,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Validate the configuration and build the model plus optimizer.
    pub fn new(config: &DrawConfig, device: &B::Device) -> Result<Self, ConfigError> {
        config.validate()?;

        let model = ConvDraw::new(config, device);
        let optim = AdamConfig::new()
            .with_grad_clipping(Some(GradientClippingConfig::Norm(GRAD_CLIP_NORM)))
            .init();

        Ok(Self {
            model,
            optim,
            learning_rate: config.learning_rate,
            eps: config.eps,
        })
    }

    /// The current model.
    pub fn model(&self) -> &ConvDraw<B> {
        &self.model
    }

    /// Give up the trainer and keep the trained model (e.g. for
    /// checkpointing via Burn's record API).
    pub fn into_model(self) -> ConvDraw<B> {
        self.model
    }

    /// One full training step on a batch `[batch, C, H, W]` in `[0, 1]`:
    /// forward unroll, loss, backward, clip, Adam update.
    pub fn step(&mut self, x: Tensor<B, 4>) -> StepOutput<B> {
        let output = self.model.forward(x.clone());
        let losses = draw_loss(&output, x, self.eps);
        let cost = losses.total();

        let grads = GradientsParams::from_grads(cost.backward(), &self.model);
        self.warn_missing_gradients(&grads);

        self.model = self
            .optim
            .step(self.learning_rate, self.model.clone(), grads);

        StepOutput {
            lx: losses.lx.into_scalar().elem::<f32>(),
            lz: losses.lz.into_scalar().elem::<f32>(),
            mean_canvas: output.final_mean().detach(),
        }
    }

    /// Report every parameter the backward pass left without a gradient.
    fn warn_missing_gradients(&self, grads: &GradientsParams) {
        let mut visitor = MissingGradVisitor::<B> {
            grads,
            missing: Vec::new(),
            _backend: PhantomData,
        };
        self.model.visit(&mut visitor);

        for id in visitor.missing {
            warn!("no gradient for parameter {id:?}, skipping its update");
        }
    }
}

struct MissingGradVisitor<'a, B: AutodiffBackend> {
    grads: &'a GradientsParams,
    missing: Vec<ParamId>,
    _backend: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for MissingGradVisitor<'_, B> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if self.grads.get::<B::InnerBackend, D>(id).is_none() {
            self.missing.push(id);
        }
    }
}
