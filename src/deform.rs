//! Audio-driven radial displacement over a fixed base mesh.

use crate::analysis::FeatureVector;
use crate::mesh::{BaseMesh, SphericalCache, SphericalVertex, Vertex};
use crate::params::DeformTuning;

/// Maps feature vectors through a per-vertex displacement function.
///
/// Pure: the same geometry and features always produce the same buffer, and
/// nothing here touches shared state. Cost is O(bins) per vertex, which is
/// why full passes run on the worker context rather than the render path.
#[derive(Debug, Clone)]
pub struct Deformer {
    tuning: DeformTuning,
}

impl Deformer {
    pub fn new(tuning: DeformTuning) -> Self {
        Self { tuning }
    }

    /// Radial scale at one vertex.
    ///
    /// Each bin contributes its feature value, tapered by the weighting
    /// curve and spread over the surface by a bin-dependent angular phase.
    /// Degenerate inputs (origin vertex, fewer than two bins, non-finite
    /// accumulation) fall back to the identity scale.
    pub fn scale_at(&self, sph: SphericalVertex, features: &FeatureVector) -> f32 {
        let bin_count = features.len();
        if bin_count < 2 || sph.r == 0.0 {
            return 1.0;
        }

        let l = bin_count as f32;
        let mut sum = 0.0f32;
        for (i, &f) in features.as_slice().iter().enumerate() {
            let phase = (i * i) as f32 * self.tuning.phase / l;
            let angular = (phase * sph.lat).sin() + (phase * sph.lon).cos();
            sum += f * self.tuning.weighting.factor(i, bin_count) * angular;
        }

        if sum.is_finite() {
            1.0 + sum
        } else {
            1.0
        }
    }

    /// Recompute the whole deformed buffer from the base mesh and the given
    /// features.
    ///
    /// Scaling is uniform and radial: direction is preserved, only the
    /// magnitude changes. The buffer is rebuilt whole each pass, never
    /// patched in place.
    pub fn deform(
        &self,
        base: &BaseMesh,
        cache: &SphericalCache,
        features: &FeatureVector,
    ) -> Vec<Vertex> {
        base.vertices()
            .iter()
            .zip(cache.coords())
            .map(|(v, &sph)| {
                let scale = self.scale_at(sph, features);
                Vertex {
                    position: [
                        v.position[0] * scale,
                        v.position[1] * scale,
                        v.position[2] * scale,
                    ],
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FeatureExtractor;
    use crate::params::AnalyzerConfig;

    fn quad_mesh() -> (BaseMesh, SphericalCache) {
        let base = BaseMesh::from_positions(vec![
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [-1.0, 0.0, 0.0],
        ]);
        let cache = SphericalCache::from_mesh(&base);
        (base, cache)
    }

    #[test]
    fn test_zero_features_are_identity() {
        let (base, cache) = quad_mesh();
        let deformer = Deformer::new(DeformTuning::default());

        let out = deformer.deform(&base, &cache, &FeatureVector::zeros(4));

        assert_eq!(out.as_slice(), base.vertices());
    }

    #[test]
    fn test_scale_is_finite_everywhere() {
        let base = BaseMesh::from_positions(vec![
            [0.0, 0.0, 0.0], // origin: no angles to speak of
            [1.0, 2.0, 3.0],
            [-5.0, 0.1, 0.0],
        ]);
        let cache = SphericalCache::from_mesh(&base);
        let deformer = Deformer::new(DeformTuning::default());

        let features = FeatureVector::from_values(vec![1e20, -1e20, 40.0, 0.0]);
        let out = deformer.deform(&base, &cache, &features);

        for v in &out {
            assert!(v.position.iter().all(|c| c.is_finite()));
        }
        // The origin vertex stays put.
        assert_eq!(out[0].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_degenerate_bin_counts_are_identity() {
        let (base, cache) = quad_mesh();
        let deformer = Deformer::new(DeformTuning::default());

        for features in [FeatureVector::zeros(0), FeatureVector::from_values(vec![3.0])] {
            let out = deformer.deform(&base, &cache, &features);
            assert_eq!(out.as_slice(), base.vertices());
        }
    }

    #[test]
    fn test_deform_preserves_direction() {
        let (base, cache) = quad_mesh();
        let deformer = Deformer::new(DeformTuning::default());

        let features = FeatureVector::from_values(vec![0.5, -0.25, 1.0, 0.75]);
        let out = deformer.deform(&base, &cache, &features);

        for (v, b) in out.iter().zip(base.vertices()) {
            // Each output is the base position times one scalar.
            let scale = v
                .position
                .iter()
                .zip(&b.position)
                .filter(|(_, &bc)| bc != 0.0)
                .map(|(&vc, &bc)| vc / bc)
                .next()
                .unwrap();
            for (vc, bc) in v.position.iter().zip(&b.position) {
                assert!((vc - bc * scale).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_full_path_matches_closed_form() {
        // Drive the real extractor: three silent frames to establish the
        // baseline, then one loud frame.
        let config = AnalyzerConfig {
            bin_count: 4,
            ..AnalyzerConfig::default()
        };
        let mut extractor = FeatureExtractor::new(config);

        for _ in 0..3 {
            let f = extractor
                .ingest_frame(&[0.0, 0.0, 0.0, 0.0], 0.0, 1.0)
                .unwrap();
            assert!(f.as_slice().iter().all(|&v| v == 0.0));
        }
        let features = extractor
            .ingest_frame(&[1.0, 2.0, 3.0, 4.0], 0.0, 1.0)
            .unwrap();

        // After a zero-history baseline, one frame of value x standardizes
        // to (x - x/4) / sqrt(x²/4) = 1.5 regardless of x.
        for &f in features.as_slice() {
            assert!((f - 1.5).abs() < 1e-4, "feature was {f}");
        }

        // Vertex (1, 0, 0): lat = 0 and lon = 0, so every sine term drops
        // out and every cosine term is 1.
        let (base, cache) = quad_mesh();
        let deformer = Deformer::new(DeformTuning::default());
        let scale = deformer.scale_at(cache.coords()[0], &features);

        let expected: f32 = 1.0
            + (0..4)
                .map(|i| 1.5 / (4.0 * ((i + 2) as f32).ln()))
                .sum::<f32>();
        assert!((scale - expected).abs() < 1e-4, "scale {scale} vs {expected}");

        // And the deformed vertex is the base vertex times that scale.
        let out = deformer.deform(&base, &cache, &features);
        assert!((out[0].position[0] - expected).abs() < 1e-4);
        assert_eq!(out[0].position[1], 0.0);
        assert_eq!(out[0].position[2], 0.0);
    }
}
