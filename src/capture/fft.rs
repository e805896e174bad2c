//! Windowing and spectrum reduction shared by every capture source.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::SpectrumFrame;
use crate::params::{AnalyzerConfig, CaptureConfig};

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Turns windows of time-domain samples into [`SpectrumFrame`]s of
/// per-bin decibel levels.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    capture: CaptureConfig,
    bin_count: usize,
    floor_db: f32,
    ceil_db: f32,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    pub fn new(capture: CaptureConfig, analyzer: &AnalyzerConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(capture.fft_size);
        Self {
            fft,
            bin_count: analyzer.bin_count,
            floor_db: analyzer.floor_db,
            ceil_db: analyzer.ceil_db,
            capture,
            scratch: Vec::new(),
        }
    }

    /// Analyze one window of exactly `fft_size` samples.
    ///
    /// Positive-frequency magnitudes are folded down to the configured bin
    /// count by group averaging. Bin 0 (DC) and bins above the spectrum
    /// cutoff are left at the calibration floor.
    pub fn analyze(&mut self, samples: &[f32]) -> SpectrumFrame {
        let size = self.capture.fft_size;
        debug_assert_eq!(samples.len(), size);

        self.scratch.clear();
        self.scratch.extend(
            samples
                .iter()
                .enumerate()
                .map(|(i, &s)| Complex::new(s * hann_window(i, size), 0.0)),
        );
        self.fft.process(&mut self.scratch);

        let half = &self.scratch[..size / 2];
        let mut bins = vec![self.floor_db; self.bin_count];
        if self.bin_count > 0 {
            let live = ((self.bin_count as f32 * self.capture.spectrum_cutoff) as usize)
                .min(self.bin_count);
            let group = (half.len() / self.bin_count).max(1);

            for (b, bin) in bins.iter_mut().enumerate().take(live).skip(1) {
                let start = b * group;
                let end = (start + group).min(half.len());
                if start >= end {
                    break;
                }
                let magnitude =
                    half[start..end].iter().map(|c| c.norm()).sum::<f32>() / (end - start) as f32;
                *bin = self.to_db(magnitude);
            }
        }

        SpectrumFrame {
            bins,
            floor_db: self.floor_db,
            ceil_db: self.ceil_db,
        }
    }

    /// Map a linear magnitude into the calibrated decibel range.
    fn to_db(&self, magnitude: f32) -> f32 {
        // A full-scale sine concentrated in one bin lands near 0 dB.
        let amplitude = 2.0 * magnitude / self.capture.fft_size as f32;
        let db = 20.0 * amplitude.max(1e-10).log10();
        db.clamp(self.floor_db, self.ceil_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_cycles: f32, amplitude: f32, size: usize) -> Vec<f32> {
        (0..size)
            .map(|i| amplitude * (2.0 * PI * freq_cycles * i as f32 / size as f32).sin())
            .collect()
    }

    fn analyzer() -> SpectrumAnalyzer {
        SpectrumAnalyzer::new(CaptureConfig::default(), &AnalyzerConfig::default())
    }

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_silence_sits_at_the_floor() {
        let mut spectrum = analyzer();
        let frame = spectrum.analyze(&vec![0.0; 1024]);

        assert_eq!(frame.bins.len(), 32);
        assert!(frame.bins.iter().all(|&b| b == frame.floor_db));
    }

    #[test]
    fn test_tone_raises_a_live_bin() {
        let mut spectrum = analyzer();

        // 40 cycles per 1024-sample window: magnitude bin 40, output bin 2.
        let frame = spectrum.analyze(&sine(40.0, 0.5, 1024));

        assert!(frame.bins[2] > frame.floor_db);
        // DC and the upper half of the output bins are never driven.
        assert_eq!(frame.bins[0], frame.floor_db);
        assert!(frame.bins[16..].iter().all(|&b| b == frame.floor_db));
    }

    #[test]
    fn test_louder_is_higher() {
        let mut spectrum = analyzer();

        let quiet = spectrum.analyze(&sine(40.0, 0.05, 1024));
        let loud = spectrum.analyze(&sine(40.0, 0.5, 1024));

        assert!(loud.bins[2] > quiet.bins[2]);
    }

    #[test]
    fn test_levels_are_clamped_to_calibration_range() {
        let mut spectrum = analyzer();
        let frame = spectrum.analyze(&sine(40.0, 1.0, 1024));

        for &b in &frame.bins {
            assert!(b >= frame.floor_db && b <= frame.ceil_db);
        }
    }
}
