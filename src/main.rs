//! Pulsemesh - audio-reactive mesh deformation
//!
//! Live audio deforms a sphere in real time: every frequency bin is
//! standardized against its own history and rippled across the surface.

mod analysis;
mod capture;
mod cli;
mod deform;
mod error;
mod mesh;
mod params;
mod pipeline;

use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec3;
use log::{info, warn};

use capture::SpectrumSource;
use cli::Args;
use error::CaptureError;
use mesh::BaseMesh;
use params::{CaptureConfig, DeformTuning};
use pipeline::PipelineHandle;

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CaptureError> {
    let analyzer = args.analyzer_config();
    let capture = CaptureConfig::default();

    let source = match &args.wav {
        Some(path) => SpectrumSource::from_wav(path, capture, &analyzer)?,
        None => SpectrumSource::from_mic(capture, &analyzer)?,
    };

    let mut pipeline = PipelineHandle::spawn(analyzer, DeformTuning::default());

    let base = BaseMesh::uv_sphere(args.rings, args.segments, 1.0);
    info!("base mesh: {} vertices", base.len());
    let rest = base.vertices().to_vec();
    pipeline.load_base_mesh(base.vertices().iter().map(|v| v.position).collect());

    let tick = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let started = Instant::now();
    let mut last_report = Instant::now();

    loop {
        let frame_started = Instant::now();

        // Audio cadence: zero, one or many frames may have arrived since
        // the previous tick. Ingest in arrival order; the newest wins.
        let mut input_finished = false;
        loop {
            match source.frames.try_recv() {
                Ok(frame) => {
                    if let Err(e) = pipeline.ingest_frame(&frame.bins, frame.floor_db, frame.ceil_db)
                    {
                        warn!("dropped frame: {e}");
                    }
                }
                Err(crossbeam_channel::TryRecvError::Empty) => break,
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    input_finished = true;
                    break;
                }
            }
        }

        // Render cadence: one poll per tick, never blocking. This is where
        // a renderer would upload the buffer.
        let vertices = pipeline.fetch_vertices();

        if last_report.elapsed() >= Duration::from_secs(1) && !vertices.is_empty() {
            let peak = vertices
                .iter()
                .zip(&rest)
                .map(|(v, r)| {
                    (Vec3::from_array(v.position) - Vec3::from_array(r.position)).length()
                })
                .fold(0.0f32, f32::max);
            info!("{} vertices, peak displacement {:.3}", vertices.len(), peak);
            last_report = Instant::now();
        }

        if input_finished {
            info!("input finished");
            break;
        }
        if let Some(limit) = args.duration {
            if started.elapsed().as_secs_f32() >= limit {
                break;
            }
        }

        if let Some(remaining) = tick.checked_sub(frame_started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    Ok(())
}
