//! # The DRAW Model
//!
//! The pieces of the unrolled encoder-decoder state machine:
//!
//! | Component | Role |
//! |-----------|------|
//! | [`LatentSampler`] | Gaussian posterior + reparameterized draw |
//! | [`ReadHead`] | canvas -> half-resolution features |
//! | [`WriteHead`] | decoder features -> canvas-space update |
//! | [`ConvDraw`] | the T-step unroll driver |
//!
//! [`ConvDraw::forward`] is the whole forward pass; it returns a
//! [`DrawOutput`] holding the canvas sequence plus all per-timestep Gaussian
//! parameters, which [`crate::loss::draw_loss`] consumes.

pub mod draw;
pub mod heads;
pub mod sampler;

pub use draw::{ConvDraw, DrawOutput};
pub use heads::{ReadHead, WriteHead};
pub use sampler::{LatentSample, LatentSampler};
