//! Parameter definitions with documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Documented ranges and meanings
//! - Type safety where possible

mod analysis;
mod deform;

// Re-export all types
pub use analysis::{AnalyzerConfig, CaptureConfig, VarianceMode};
pub use deform::{DeformTuning, Weighting};
