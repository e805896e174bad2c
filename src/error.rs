//! Error types for frame ingestion and audio capture.

use thiserror::Error;

/// Rejection of a single analysis frame.
///
/// The offending frame is dropped whole; prior session state is untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Input length does not match the bin count fixed at session start.
    #[error("frame has {got} bins, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

/// Failures while opening or running an audio source.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio input device available")]
    NoDevice,

    #[error("could not query device config: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("could not build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("could not start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("could not read wav file: {0}")]
    Wav(#[from] hound::Error),

    #[error("invalid capture config: {0}")]
    Config(String),
}
