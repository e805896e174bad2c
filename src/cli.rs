//! Command-line argument parsing.

use clap::Parser;

use crate::params::AnalyzerConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "pulsemesh")]
#[command(about = "Audio-reactive mesh deformation", long_about = None)]
pub struct Args {
    /// Analyze a WAV file instead of the default input device
    #[arg(long, value_name = "FILE")]
    pub wav: Option<std::path::PathBuf>,

    /// Number of frequency bins
    #[arg(long, default_value = "32")]
    pub bins: usize,

    /// Render-side fetch rate (frames per second)
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Stop after this many seconds (runs until the input ends by default)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Latitude rings of the generated base sphere
    #[arg(long, default_value = "24")]
    pub rings: usize,

    /// Vertices per ring of the generated base sphere
    #[arg(long, default_value = "32")]
    pub segments: usize,
}

impl Args {
    /// Analyzer configuration implied by the arguments.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            bin_count: self.bins,
            ..AnalyzerConfig::default()
        }
    }
}
