//! Streaming audio feature analysis.
//!
//! Raw per-bin spectrum levels are range-normalized and standardized against
//! the session's own running history, so the downstream deformation reacts
//! to how *unusual* the current frame is rather than to absolute loudness.

mod extractor;
mod stats;

// Re-export public types
pub use extractor::{FeatureExtractor, FeatureVector};
pub use stats::RunningStats;
