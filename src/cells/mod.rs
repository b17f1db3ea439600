//! # Recurrent Cell Implementations
//!
//! Single-timestep convolutional recurrent cells. A cell processes one
//! timestep at a time and is driven by the unroll loop in
//! [`crate::model::ConvDraw`], which threads the `(hidden, cell)` state pair
//! through all T steps.
//!
//! The DRAW model instantiates two independent [`ConvLstmCell`]s:
//!
//! | Instance | Input | Stride | State resolution |
//! |----------|-------|--------|------------------|
//! | encoder | `concat(x, epsilon)` at canvas resolution | 2 | half |
//! | decoder | `concat(z, read(canvas))` at half resolution | 1 | half |
//!
//! Each instance owns exactly one parameter set which every timestep reuses;
//! sharing is structural (the cell is a module field), not toggled by state.

pub mod conv_lstm_cell;

pub use conv_lstm_cell::ConvLstmCell;
