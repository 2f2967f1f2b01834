//! Prediction heuristics for task selection

pub mod ema;
pub mod heuristics;

pub use ema::{EmaPredictor, EMA_ALPHA_PER_256};
pub use heuristics::HeuristicEngine;
