//! Messages crossing the producer/worker boundary.
//!
//! Everything moves by value: the two contexts never share mutable state, so
//! no partial-update race is representable. Requests are FIFO on their
//! channel; completed buffers come back on a separate channel and may
//! interleave with requests arbitrarily.

use crate::analysis::FeatureVector;

/// Producer → worker requests.
#[derive(Debug)]
pub enum Request {
    /// Start a session with a fixed bin count.
    Init { bin_count: usize },

    /// Deliver the immutable rest-shape geometry. Sent once per session.
    LoadMesh { positions: Vec<[f32; 3]> },

    /// Replace the pending feature vector. An unconsumed older vector is
    /// superseded, never merged.
    UpdateFeatures(FeatureVector),

    /// Run one computation pass if fresher features arrived since the last
    /// completed one.
    Fetch,
}
