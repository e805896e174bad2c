//! Audio analysis configuration.

use crate::error::CaptureError;

/// Which divisor the per-bin variance uses.
///
/// Historical tunings of this pipeline disagreed; the unbiased sample
/// convention is the contract, the population one stays available as tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceMode {
    /// Divide the running sum of squared deviations by `count - 1`.
    #[default]
    Sample,
    /// Divide by `count`.
    Population,
}

/// Feature extraction configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Number of frequency bins per frame. Fixed for the session lifetime.
    pub bin_count: usize,

    /// Level treated as silence (decibels).
    pub floor_db: f32,

    /// Level treated as full intensity (decibels).
    pub ceil_db: f32,

    /// Gain applied after range normalization (dimensionless).
    pub gain: f32,

    /// Variance divisor convention.
    pub variance_mode: VarianceMode,

    /// Variances at or below this are treated as "no usable history": the
    /// bin's feature is emitted as 0 instead of dividing by almost nothing.
    pub variance_floor: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            bin_count: 32,
            floor_db: -100.0,
            ceil_db: -30.0,
            gain: 50.0,
            variance_mode: VarianceMode::Sample,
            variance_floor: 1e-6,
        }
    }
}

/// Spectrum capture configuration.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// FFT window size in samples (must be a power of 2).
    pub fft_size: usize,

    /// Analysis interval (milliseconds). 50 ms = 20 frames per second.
    pub update_interval_ms: u64,

    /// Fraction of the output bins driven by live spectrum data; bins above
    /// the cutoff stay at the calibration floor.
    pub spectrum_cutoff: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            update_interval_ms: 50,
            spectrum_cutoff: 0.5,
        }
    }
}

impl CaptureConfig {
    /// Validate configuration (FFT size must be a power of 2, etc.)
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !self.fft_size.is_power_of_two() {
            return Err(CaptureError::Config(format!(
                "fft size must be a power of 2, got {}",
                self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.spectrum_cutoff) {
            return Err(CaptureError::Config(format!(
                "spectrum cutoff must be within 0..=1, got {}",
                self.spectrum_cutoff
            )));
        }
        Ok(())
    }
}
