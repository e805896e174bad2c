//! Worker-side session state and computation loop.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use super::protocol::Request;
use crate::analysis::FeatureVector;
use crate::deform::Deformer;
use crate::mesh::{BaseMesh, SphericalCache, Vertex};
use crate::params::DeformTuning;

/// Session lifecycle. Once `Ready` the session stays there until teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    AwaitingBaseMesh,
    Ready,
}

/// Everything the computation context owns. Nothing in here is reachable
/// from the producer side.
pub(super) struct Worker {
    state: SessionState,
    bin_count: usize,
    base: Option<BaseMesh>,
    spherical: Option<SphericalCache>,
    deformer: Deformer,
    /// Most recent features, replaced wholesale on every update.
    features: FeatureVector,
    /// Set when `features` is newer than the last completed pass.
    dirty: bool,
    results: Sender<Arc<[Vertex]>>,
}

impl Worker {
    /// Body of the worker thread: drain requests until the producer side
    /// hangs up.
    pub(super) fn run(
        tuning: DeformTuning,
        requests: Receiver<Request>,
        results: Sender<Arc<[Vertex]>>,
    ) {
        let mut worker = Worker {
            state: SessionState::Idle,
            bin_count: 0,
            base: None,
            spherical: None,
            deformer: Deformer::new(tuning),
            features: FeatureVector::zeros(0),
            dirty: false,
            results,
        };

        while let Ok(request) = requests.recv() {
            worker.handle(request);
        }
        debug!("deformation worker shutting down");
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Init { bin_count } => self.init(bin_count),
            Request::LoadMesh { positions } => self.load_mesh(positions),
            Request::UpdateFeatures(features) => self.update_features(features),
            Request::Fetch => self.fetch(),
        }
    }

    fn init(&mut self, bin_count: usize) {
        if self.state != SessionState::Idle {
            warn!("ignoring duplicate session init");
            return;
        }
        self.bin_count = bin_count;
        self.features = FeatureVector::zeros(bin_count);
        self.dirty = false;
        self.state = SessionState::AwaitingBaseMesh;
    }

    fn load_mesh(&mut self, positions: Vec<[f32; 3]>) {
        if self.state != SessionState::AwaitingBaseMesh {
            warn!("ignoring base mesh delivered in {:?} state", self.state);
            return;
        }
        let base = BaseMesh::from_positions(positions);
        let spherical = SphericalCache::from_mesh(&base);
        info!("base mesh loaded: {} vertices", base.len());

        self.base = Some(base);
        self.spherical = Some(spherical);
        self.state = SessionState::Ready;

        // Run a pass with whatever features are current (all zeros right
        // after init) so the very first fetch already has a complete buffer.
        self.compute_pass();
    }

    fn update_features(&mut self, features: FeatureVector) {
        if self.state == SessionState::Idle {
            warn!("ignoring features before session init");
            return;
        }
        if features.len() != self.bin_count {
            warn!(
                "dropping feature vector of length {}, session uses {}",
                features.len(),
                self.bin_count
            );
            return;
        }
        self.features = features;
        self.dirty = true;
    }

    fn fetch(&mut self) {
        // Before the mesh arrives there is nothing to compute; the producer
        // keeps answering polls with its empty snapshot until then.
        if self.state == SessionState::Ready && self.dirty {
            self.compute_pass();
        }
    }

    /// One full-buffer computation. Runs to completion: a newer feature
    /// vector arriving mid-pass waits in the queue and causes exactly one
    /// further pass at the next fetch.
    fn compute_pass(&mut self) {
        let (Some(base), Some(spherical)) = (&self.base, &self.spherical) else {
            return;
        };
        let buffer: Arc<[Vertex]> = self.deformer.deform(base, spherical, &self.features).into();
        self.dirty = false;

        // A closed results channel just means teardown has started.
        let _ = self.results.send(buffer);
    }
}
