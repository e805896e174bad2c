//! Deformation tuning parameters.

use std::f32::consts::PI;

/// Per-bin weighting curve applied inside the displacement sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// `1 / (L * ln(i + 2))`: tapers bin contribution logarithmically so
    /// high-frequency bins ripple the surface instead of dominating it.
    #[default]
    LogTaper,

    /// `1 / L`: every bin contributes equally.
    Flat,
}

impl Weighting {
    /// Weight of bin `i` out of `bin_count`.
    pub fn factor(self, i: usize, bin_count: usize) -> f32 {
        let l = bin_count as f32;
        match self {
            Weighting::LogTaper => 1.0 / (l * ((i + 2) as f32).ln()),
            Weighting::Flat => 1.0 / l,
        }
    }
}

/// Displacement field tuning.
#[derive(Debug, Clone)]
pub struct DeformTuning {
    /// Per-bin weighting curve.
    pub weighting: Weighting,

    /// Angular constant of the bin phase `i² · phase / L` (radians).
    pub phase: f32,
}

impl Default for DeformTuning {
    fn default() -> Self {
        Self {
            weighting: Weighting::LogTaper,
            phase: PI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_taper_factor() {
        let w = Weighting::LogTaper;

        assert!((w.factor(0, 4) - 1.0 / (4.0 * 2.0f32.ln())).abs() < 1e-7);
        assert!((w.factor(3, 4) - 1.0 / (4.0 * 5.0f32.ln())).abs() < 1e-7);

        // Later bins always weigh less.
        assert!(w.factor(1, 32) < w.factor(0, 32));
        assert!(w.factor(31, 32) < w.factor(16, 32));
    }

    #[test]
    fn test_flat_factor() {
        assert_eq!(Weighting::Flat.factor(0, 8), 0.125);
        assert_eq!(Weighting::Flat.factor(7, 8), 0.125);
    }
}
