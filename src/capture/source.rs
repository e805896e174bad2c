//! Capture sources: microphone and WAV file front-ends.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};

use super::fft::SpectrumAnalyzer;
use super::SpectrumFrame;
use crate::error::CaptureError;
use crate::params::{AnalyzerConfig, CaptureConfig};

/// A running capture source.
///
/// Frames arrive on `frames` at the analysis cadence; the channel
/// disconnects when the source ends (end of file, or the source dropped).
pub struct SpectrumSource {
    /// Analysis frames, one per interval.
    pub frames: Receiver<SpectrumFrame>,

    /// Input stream kept alive for the lifetime of the source (mic only).
    _stream: Option<cpal::Stream>,

    /// Analysis thread handle.
    _analysis: thread::JoinHandle<()>,
}

impl SpectrumSource {
    /// Open the default input device and start analyzing it.
    pub fn from_mic(
        capture: CaptureConfig,
        analyzer: &AnalyzerConfig,
    ) -> Result<Self, CaptureError> {
        capture.validate()?;

        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;
        let config = device.default_input_config()?;
        info!(
            "capture: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            config.sample_rate().0,
            config.channels(),
        );
        let channels = config.channels().max(1) as usize;

        let sample_buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
        let callback_buffer = Arc::clone(&sample_buffer);

        // Accumulate mono samples for the analysis thread.
        let stream = device.build_input_stream(
            &config.into(),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut buffer = callback_buffer.lock().unwrap();
                for frame in data.chunks(channels) {
                    buffer.push(frame.iter().sum::<f32>() / channels as f32);
                }
            },
            |err| warn!("input stream error: {err}"),
            None,
        )?;
        stream.play()?;

        let (frame_tx, frames) = unbounded();
        let analysis = spawn_analysis_thread(capture, analyzer.clone(), sample_buffer, frame_tx);

        Ok(Self {
            frames,
            _stream: Some(stream),
            _analysis: analysis,
        })
    }

    /// Read a WAV file and run the same analysis over it, paced at the
    /// analysis interval so downstream sees a live-like cadence.
    pub fn from_wav(
        path: &Path,
        capture: CaptureConfig,
        analyzer: &AnalyzerConfig,
    ) -> Result<Self, CaptureError> {
        capture.validate()?;

        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(CaptureError::Config("wav file reports 0 channels".into()));
        }
        info!(
            "wav: {}Hz, {} channels, {} bit",
            spec.sample_rate, spec.channels, spec.bits_per_sample
        );

        // Decode to mono up front; visualizer inputs are short.
        let channels = spec.channels as usize;
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().filter_map(Result::ok).collect(),
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .filter_map(Result::ok)
                    .map(|s| s as f32 / scale)
                    .collect()
            }
        };
        let mono: Vec<f32> = samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        let (frame_tx, frames) = unbounded();
        let analyzer = analyzer.clone();
        let analysis = thread::spawn(move || {
            let mut spectrum = SpectrumAnalyzer::new(capture.clone(), &analyzer);
            let interval = Duration::from_millis(capture.update_interval_ms);
            let hop = capture.fft_size / 2;

            let mut cursor = 0;
            while cursor + capture.fft_size <= mono.len() {
                let frame = spectrum.analyze(&mono[cursor..cursor + capture.fft_size]);
                if frame_tx.send(frame).is_err() {
                    break;
                }
                cursor += hop;
                thread::sleep(interval);
            }
            // The sender drops here; consumers observe end of input as a
            // channel disconnect.
        });

        Ok(Self {
            frames,
            _stream: None,
            _analysis: analysis,
        })
    }
}

/// Spawn the analysis thread: every interval, window the newest samples,
/// reduce them to a spectrum frame and ship it.
fn spawn_analysis_thread(
    capture: CaptureConfig,
    analyzer: AnalyzerConfig,
    samples: Arc<Mutex<Vec<f32>>>,
    frames: Sender<SpectrumFrame>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut spectrum = SpectrumAnalyzer::new(capture.clone(), &analyzer);
        let interval = Duration::from_millis(capture.update_interval_ms);

        loop {
            thread::sleep(interval);

            let frame = {
                let mut buffer = samples.lock().unwrap();
                if buffer.len() < capture.fft_size {
                    continue;
                }
                let frame = spectrum.analyze(&buffer[..capture.fft_size]);

                // 50% overlap between consecutive windows.
                buffer.drain(..capture.fft_size / 2);
                frame
            };

            if frames.send(frame).is_err() {
                break; // receiver gone, capture is over
            }
        }
    })
}
