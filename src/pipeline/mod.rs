//! Two-context deformation pipeline.
//!
//! A producer context (audio callbacks plus the render loop's per-frame
//! poll) feeds feature vectors in and pulls deformed buffers out; an
//! isolated worker context owns the geometry and does the per-vertex math.
//! The contexts share nothing mutable. Requests flow one way, completed
//! buffers flow back as immutable snapshots, and the newest value always
//! supersedes older unconsumed ones.
//!
//! At most one computation pass is ever in progress: the worker is a single
//! thread and starts a pass only when a poll finds fresher features than the
//! last completed buffer. A slow pass therefore lowers the effective update
//! rate instead of piling up work, and the render side at worst reads a
//! buffer that is one update stale.

mod handle;
mod protocol;
mod worker;

// Re-export public types
pub use handle::PipelineHandle;
pub use protocol::Request;
