//! Entity graph and run state of a rigid-body simulation.
//!
//! - [`particle`] – Typed point particles, identified by label.
//! - [`rigidbody`] – Labeled clusters with derived mass, center of mass, and inertia.
//! - [`interaction`] – Pairwise potential parameters.
//! - [`sim_box`] – The simulation cell.
//! - [`registry`] – Label-keyed, duplicate-free entity collections.
//! - [`simulation`] – The aggregate root: parameters, instance counts, lineage, identity.

pub mod interaction;
pub mod particle;
pub mod registry;
pub mod rigidbody;
pub mod sim_box;
pub mod simulation;
