//! Producer-side session handle.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;

use super::protocol::Request;
use super::worker::Worker;
use crate::analysis::{FeatureExtractor, FeatureVector};
use crate::error::FrameError;
use crate::mesh::Vertex;
use crate::params::{AnalyzerConfig, DeformTuning};

/// Owner of one deformation session.
///
/// Lives on the audio/UI side; the heavy per-vertex math happens on a
/// dedicated worker thread reachable only through message passing. Every
/// method returns without waiting on the worker: the render path polls and
/// gets whatever the worker has most recently finished.
pub struct PipelineHandle {
    extractor: FeatureExtractor,
    /// `None` only during teardown.
    requests: Option<Sender<Request>>,
    results: Receiver<Arc<[Vertex]>>,
    /// Freshest completed buffer seen so far.
    latest: Arc<[Vertex]>,
    worker: Option<thread::JoinHandle<()>>,
}

impl PipelineHandle {
    /// Spawn the computation context and initialize a session for
    /// `config.bin_count` bins.
    pub fn spawn(config: AnalyzerConfig, tuning: DeformTuning) -> Self {
        let (request_tx, request_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();

        let worker = thread::spawn(move || Worker::run(tuning, request_rx, result_tx));

        let handle = Self {
            extractor: FeatureExtractor::new(config.clone()),
            requests: Some(request_tx),
            results: result_rx,
            latest: Vec::new().into(),
            worker: Some(worker),
        };
        handle.send(Request::Init {
            bin_count: config.bin_count,
        });
        handle
    }

    /// Deliver the base mesh. The session accepts exactly one; later
    /// deliveries are ignored.
    pub fn load_base_mesh(&self, positions: Vec<[f32; 3]>) {
        self.send(Request::LoadMesh { positions });
    }

    /// Ingest one raw analysis frame: extract features and hand them to the
    /// worker, superseding any unconsumed vector.
    ///
    /// A frame of the wrong length is dropped whole and the session state is
    /// left untouched.
    pub fn ingest_frame(&mut self, raw: &[f32], floor: f32, ceil: f32) -> Result<(), FrameError> {
        let features = self.extractor.ingest_frame(raw, floor, ceil)?;
        self.send(Request::UpdateFeatures(features));
        Ok(())
    }

    /// Hand an already-extracted feature vector to the worker.
    pub fn update_features(&self, features: FeatureVector) {
        self.send(Request::UpdateFeatures(features));
    }

    /// Latest completed deformed buffer.
    ///
    /// Never blocks: drains whatever passes the worker finished since the
    /// last call, nudges it to start a fresh one if newer features are
    /// pending, and returns the newest complete snapshot (which may trail
    /// the newest features by one pass). Empty until the base mesh is
    /// loaded and the first pass has finished.
    pub fn fetch_vertices(&mut self) -> Arc<[Vertex]> {
        for buffer in self.results.try_iter() {
            self.latest = buffer;
        }
        self.send(Request::Fetch);
        Arc::clone(&self.latest)
    }

    fn send(&self, request: Request) {
        if let Some(requests) = &self.requests {
            // A closed channel means the worker died; the session keeps
            // serving its last snapshot rather than taking the caller down.
            if requests.send(request).is_err() {
                warn!("deformation worker is gone, request dropped");
            }
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::deform::Deformer;
    use crate::mesh::{BaseMesh, SphericalCache};

    const QUAD: [[f32; 3]; 4] = [
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [-1.0, 0.0, 0.0],
    ];

    fn config(bin_count: usize) -> AnalyzerConfig {
        AnalyzerConfig {
            bin_count,
            ..AnalyzerConfig::default()
        }
    }

    /// Poll the handle until `done` holds or a generous deadline passes.
    fn wait_for(
        handle: &mut PipelineHandle,
        mut done: impl FnMut(&mut PipelineHandle) -> bool,
    ) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if done(handle) {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_fetch_before_mesh_is_empty() {
        let mut handle = PipelineHandle::spawn(config(4), DeformTuning::default());
        assert!(handle.fetch_vertices().is_empty());
    }

    #[test]
    fn test_first_pass_is_identity() {
        let mut handle = PipelineHandle::spawn(config(4), DeformTuning::default());
        handle.load_base_mesh(QUAD.to_vec());

        assert!(wait_for(&mut handle, |h| !h.fetch_vertices().is_empty()));

        let buffer = handle.fetch_vertices();
        assert_eq!(buffer.len(), QUAD.len());
        for (v, base) in buffer.iter().zip(QUAD) {
            assert_eq!(v.position, base);
        }
    }

    #[test]
    fn test_latest_update_wins() {
        let mut handle = PipelineHandle::spawn(config(4), DeformTuning::default());
        handle.load_base_mesh(QUAD.to_vec());
        assert!(wait_for(&mut handle, |h| !h.fetch_vertices().is_empty()));

        let superseded = FeatureVector::from_values(vec![10.0, 0.0, 0.0, 0.0]);
        let newest = FeatureVector::from_values(vec![-3.0, 1.0, 2.0, 0.5]);
        handle.update_features(superseded);
        handle.update_features(newest.clone());

        // The buffer that eventually comes out reflects only the newest
        // vector; requests are FIFO, so nothing can be computed from the
        // superseded one.
        let base = BaseMesh::from_positions(QUAD.to_vec());
        let cache = SphericalCache::from_mesh(&base);
        let expected = Deformer::new(DeformTuning::default()).deform(&base, &cache, &newest);

        assert!(wait_for(&mut handle, |h| {
            h.fetch_vertices().as_ref() == expected.as_slice()
        }));
    }

    #[test]
    fn test_fetch_is_idempotent_without_updates() {
        let mut handle = PipelineHandle::spawn(config(4), DeformTuning::default());
        handle.load_base_mesh(QUAD.to_vec());

        let features = FeatureVector::from_values(vec![1.0, -1.0, 0.5, 2.0]);
        handle.update_features(features.clone());

        let base = BaseMesh::from_positions(QUAD.to_vec());
        let cache = SphericalCache::from_mesh(&base);
        let expected = Deformer::new(DeformTuning::default()).deform(&base, &cache, &features);

        assert!(wait_for(&mut handle, |h| {
            h.fetch_vertices().as_ref() == expected.as_slice()
        }));

        // No updates in between: consecutive fetches return the same buffer.
        let first = handle.fetch_vertices();
        let second = handle.fetch_vertices();
        assert_eq!(first.as_ref(), second.as_ref());
    }

    #[test]
    fn test_wrong_length_features_are_dropped() {
        let mut handle = PipelineHandle::spawn(config(4), DeformTuning::default());
        handle.load_base_mesh(QUAD.to_vec());
        assert!(wait_for(&mut handle, |h| !h.fetch_vertices().is_empty()));

        // The worker refuses the malformed vector; the buffer stays identity.
        handle.update_features(FeatureVector::from_values(vec![5.0, 5.0]));
        thread::sleep(Duration::from_millis(50));

        let buffer = handle.fetch_vertices();
        for (v, base) in buffer.iter().zip(QUAD) {
            assert_eq!(v.position, base);
        }
    }

    #[test]
    fn test_ingest_frame_shape_mismatch() {
        let mut handle = PipelineHandle::spawn(config(4), DeformTuning::default());

        let err = handle.ingest_frame(&[-60.0; 3], -100.0, -30.0).unwrap_err();
        assert!(matches!(err, FrameError::ShapeMismatch { expected: 4, got: 3 }));
    }

    #[test]
    fn test_drop_tears_down_worker() {
        let handle = PipelineHandle::spawn(config(4), DeformTuning::default());
        // Dropping closes the channel and joins the worker; must not hang.
        drop(handle);
    }
}
