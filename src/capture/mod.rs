//! Spectrum capture: microphone and WAV file front-ends that emit per-bin
//! level frames at a fixed analysis cadence.
//!
//! This is the producer end of the pipeline: each frame carries raw decibel
//! levels plus the calibration range they were measured against, ready for
//! [`crate::pipeline::PipelineHandle::ingest_frame`].

mod fft;
mod source;

// Re-export public types
pub use fft::{hann_window, SpectrumAnalyzer};
pub use source::SpectrumSource;

/// One analysis frame of raw per-bin levels (decibels), together with the
/// calibration range they were measured against.
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    pub bins: Vec<f32>,
    pub floor_db: f32,
    pub ceil_db: f32,
}
