//! Starting configurations for the engine.
//!
//! - [`sampler`] – Rejection sampling of positions inside the box.
//! - [`orientation`] – Initial orientation strategies.
//! - [`snapshot`] – Assembly of the integrated particles, fresh or from a
//!   recorded frame.

pub mod orientation;
pub mod sampler;
pub mod snapshot;

pub use orientation::{OrientationKind, OrientationStrategy, UnitQuaternion, ZeroScalar};
pub use sampler::Placer;
pub use snapshot::{Snapshot, assemble};
