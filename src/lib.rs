//! Configuration, lineage, and initial placement for chained rigid-body
//! molecular-dynamics runs.
//!
//! A run is described by a YAML configuration document. `mdchain` resolves
//! that document into a [`Simulation`], following `continue` and `fork`
//! references back through earlier project files, gives the run its
//! timestamped identity, and assembles the starting configuration handed to
//! an external MD engine.
//!
//! # Features
//!
//! - **Entity graph** – Particles, rigid body templates with derived mass,
//!   center of mass and moment of inertia, pair interactions, and the box
//! - **Lineage** – Fresh runs, continuations that share their ancestor's
//!   identity and trajectory, and forks that branch from a recorded frame
//! - **Placement** – Seeded rejection sampling of rigid body centers and
//!   solvent inside the box, or reconstruction from a recorded frame
//! - **Round trip** – Every resolved simulation writes back to a project
//!   document that resolves to the same entity graph
//!
//! # Quick Start
//!
//! ```
//! use mdchain::io::{MemoryTrajectories, parse_document};
//! use mdchain::lineage::{MemoryDocuments, Resolver};
//! use mdchain::{PlacementSettings, RunPlan, SimulationMode, assemble};
//!
//! let document = parse_document(r#"
//! project_name: dimers
//! box: {Lx: 30, Ly: 30, Lz: 30}
//! particles:
//!   - C: {q: 0, m: 1, diam: 1}
//!   - A: {q: -1, m: 1, diam: 1}
//! rigidbodies:
//!   - dimer:
//!       - C: {position: [0, 0, 0], is_center: true}
//!       - A: {position: [1.0, 0, 0]}
//! interactions:
//!   - A: {with: [A, C], epsilon: 1.0, sigma: 1.0, alpha: 0.0}
//! simulation:
//!   rigidbodies:
//!     - dimer: 4
//!   kT: 1.0
//!   dt: 0.005
//!   period: 1000
//!   seed: 42
//!   duration: 100000
//! "#)?;
//!
//! let resolver = Resolver::new(MemoryDocuments::new(), "/tmp/simulations");
//! let mut sim = resolver.resolve(&document, "dimers.yaml")?;
//! assert_eq!(sim.mode(), &SimulationMode::Run);
//!
//! // Fresh runs get a new identity; artifact names follow from it.
//! sim.try_mint();
//! assert!(sim.trajectory_filename()?.starts_with("dimers_"));
//!
//! // One integrated particle per rigid body instance.
//! let snapshot = assemble(&sim, &PlacementSettings::default(), &MemoryTrajectories::new())?;
//! assert_eq!(snapshot.len(), 4);
//!
//! let plan = RunPlan::new(&sim, snapshot)?;
//! assert_eq!(plan.steps, 100000);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] – Configuration documents, recorded trajectories, and the GPU ledger
//! - [`lineage`] – Document resolution through continue and fork chains
//! - [`placement`] – Rejection sampling, orientation strategies, snapshot assembly
//! - [`engine`] – The run plan handed to the MD engine
//!
//! # Data Types
//!
//! ## Entities
//!
//! - [`Particle`] – Typed point particle, identified by label
//! - [`RigidBody`] – Labeled cluster with exactly one center member
//! - [`Interaction`] – Pair potential parameters between two types
//! - [`SimBox`] – Orthorhombic simulation cell
//! - [`EntityRegistry`] – Duplicate-free, label-keyed entity collections
//!
//! ## Runs
//!
//! - [`Simulation`] – Run parameters, instance counts, lineage, and identity
//! - [`SimulationMode`] – Run, continuation, or fork
//! - [`SimData`] – Pointer to an ancestor project file and frame
//! - [`Timestamp`] – Minted identity stamp
//!
//! ## Configuration
//!
//! - [`Settings`] – Directories and placement parameters
//! - [`PlacementSettings`] – Minimum separation, attempt cap, orientation strategy

mod config;
mod error;
mod model;

pub mod engine;
pub mod io;
pub mod lineage;
pub mod placement;

pub use error::Error;

pub use model::interaction::Interaction;
pub use model::particle::Particle;
pub use model::registry::{AnyEntity, Entity, EntityKind, EntityRegistry, Registry};
pub use model::rigidbody::RigidBody;
pub use model::sim_box::SimBox;
pub use model::simulation::{
    InstanceCount, RunParameters, SimData, Simulation, SimulationMode, Timestamp,
};

pub use config::{PathSettings, PlacementSettings, Settings, default_settings, load_settings};

pub use engine::RunPlan;
pub use placement::{OrientationKind, Snapshot, assemble};
