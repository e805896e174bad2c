//! Streaming feature extraction: raw spectrum levels in, standardized
//! feature vectors out.

use super::stats::RunningStats;
use crate::error::FrameError;
use crate::params::AnalyzerConfig;

/// Per-bin standardized signal: how far the current frame sits from the
/// session's running baseline, in standard deviations.
///
/// Always finite: degenerate math upstream is clamped to 0, never passed
/// through as NaN or infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// All-zero vector of the given length (identity deformation downstream).
    pub fn zeros(bin_count: usize) -> Self {
        Self {
            values: vec![0.0; bin_count],
        }
    }

    /// Wrap precomputed values, clamping non-finite entries to 0.
    pub fn from_values(mut values: Vec<f32>) -> Self {
        for v in &mut values {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Converts raw per-bin levels into [`FeatureVector`]s while maintaining the
/// running statistics that define the session baseline.
#[derive(Debug)]
pub struct FeatureExtractor {
    config: AnalyzerConfig,
    stats: RunningStats,
}

impl FeatureExtractor {
    pub fn new(config: AnalyzerConfig) -> Self {
        let stats = RunningStats::new(config.bin_count);
        Self { config, stats }
    }

    pub fn bin_count(&self) -> usize {
        self.config.bin_count
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Ingest one frame of raw levels measured against the `[floor, ceil]`
    /// calibration range.
    ///
    /// The frame is range-normalized, folded into the running statistics,
    /// then standardized against them. A frame of the wrong length is
    /// rejected whole: no statistics are touched.
    ///
    /// The first two frames of a session always come out all-zero: the
    /// variance is undefined until three frames of history exist.
    pub fn ingest_frame(
        &mut self,
        raw: &[f32],
        floor: f32,
        ceil: f32,
    ) -> Result<FeatureVector, FrameError> {
        if raw.len() != self.config.bin_count {
            return Err(FrameError::ShapeMismatch {
                expected: self.config.bin_count,
                got: raw.len(),
            });
        }

        let span = ceil - floor;
        let normalized: Vec<f32> = raw
            .iter()
            .map(|&x| {
                if span.abs() <= f32::EPSILON {
                    0.0
                } else {
                    self.config.gain * (x - floor) / span
                }
            })
            .collect();

        self.stats.push(&normalized);

        let values = normalized
            .iter()
            .enumerate()
            .map(|(i, &norm)| {
                let variance = self.stats.variance(i, self.config.variance_mode);
                if variance <= self.config.variance_floor {
                    0.0
                } else {
                    (norm - self.stats.mean(i)) / variance.sqrt()
                }
            })
            .collect();

        Ok(FeatureVector::from_values(values))
    }
}
