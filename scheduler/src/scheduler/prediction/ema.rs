//! EMA (Exponential Moving Average) burst predictor
//!
//! Fixed-point blend: `new = (alpha * sample + (256 - alpha) * old) / 256`.
//! Only used when `BurstEstimator::Ema` is configured.

/// Default weight of the newest sample (64/256 = 0.25)
pub const EMA_ALPHA_PER_256: u32 = 64;

/// EMA predictor for burst length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmaPredictor {
    alpha_per_256: u64,
}

impl EmaPredictor {
    pub const fn new(alpha_per_256: u32) -> Self {
        Self {
            alpha_per_256: alpha_per_256 as u64,
        }
    }

    /// Blend `sample_ms` into `current_ms`
    ///
    /// A zero `current_ms` means "no estimate yet": the sample is taken as is.
    pub fn update(&self, current_ms: u64, sample_ms: u64) -> u64 {
        if current_ms == 0 {
            return sample_ms;
        }
        (self.alpha_per_256 * sample_ms + (256 - self.alpha_per_256) * current_ms) / 256
    }
}

impl Default for EmaPredictor {
    fn default() -> Self {
        Self::new(EMA_ALPHA_PER_256)
    }
}
