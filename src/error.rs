//! Error types for lineage resolution, entity bookkeeping, and placement.
//!
//! Every variant is terminal for the call that raised it: a [`Simulation`]
//! or snapshot is either fully built or not returned at all. The CLI layer is
//! responsible for reporting and exit codes.
//!
//! [`Simulation`]: crate::Simulation

use crate::model::registry::EntityKind;
use thiserror::Error;

/// Errors raised while resolving, naming, or assembling a simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// A required key is absent from a configuration document.
    #[error("missing required field '{field}' in {context}")]
    MissingField {
        /// Name of the missing key.
        field: &'static str,
        /// Section or document the key was expected in.
        context: String,
    },

    /// A key is present but its value cannot be used.
    #[error("invalid value for '{field}': {detail}")]
    InvalidField {
        /// Name of the offending key.
        field: &'static str,
        /// Description of the problem.
        detail: String,
    },

    /// A label lookup against a registry or catalog failed.
    #[error("{kind} with label '{label}' was not found")]
    NotFound {
        /// Kind of entity that was looked up.
        kind: EntityKind,
        /// The label that was requested.
        label: String,
    },

    /// An entity of the wrong kind was offered to a registry.
    #[error("cannot add {found} to the {expected} registry")]
    TypeMismatch {
        /// Kind the registry holds.
        expected: EntityKind,
        /// Kind of the rejected entity.
        found: EntityKind,
    },

    /// A second entity with an already registered label was added.
    #[error("{kind} with label '{label}' is already registered")]
    DuplicateLabel {
        /// Kind of entity that was added.
        kind: EntityKind,
        /// The duplicated label.
        label: String,
    },

    /// A rigid body has no member flagged as its center.
    #[error("rigid body '{0}' has no center particle")]
    NoCenterParticle(String),

    /// A rigid body has more than one member flagged as its center.
    #[error("rigid body '{label}' has {count} center particles, exactly one is required")]
    MultipleCenterParticles {
        /// Label of the rigid body template.
        label: String,
        /// Number of members flagged as center.
        count: usize,
    },

    /// A frame index lies beyond the frames recorded for a run.
    #[error("frame {frame} is out of bounds (run records {frames} frames)")]
    OutOfBounds {
        /// Requested frame index.
        frame: i64,
        /// Number of frames the run records.
        frames: u64,
    },

    /// An artifact name was requested before the simulation was minted.
    #[error("project '{0}' has not been minted; artifact names are undefined")]
    NotMinted(String),

    /// A base file name does not follow the `{project}_{date}_{time}.yaml` scheme.
    #[error("'{0}' is not a minted project file name")]
    InvalidProjectFile(String),

    /// The rejection sampler ran out of attempts.
    #[error("could not place particle {index} after {attempts} attempts")]
    PlacementExhausted {
        /// Slot index of the particle being placed.
        index: usize,
        /// Number of attempts made.
        attempts: usize,
    },

    /// An explicit fixed position overlaps an already placed particle.
    #[error("fixed position {position:?} of particle {index} collides with particle {other}")]
    FixedPlacementCollision {
        /// Slot index of the particle being placed.
        index: usize,
        /// Slot index of the particle it collides with.
        other: usize,
        /// The fixed position that was requested.
        position: [f64; 3],
    },

    /// A document appears twice in its own ancestry.
    #[error("lineage cycle detected: {}", chain.join(" -> "))]
    LineageCycle {
        /// The chain of documents, ending with the repeated one.
        chain: Vec<String>,
    },

    /// Reading or writing an external artifact failed.
    #[error(transparent)]
    Io(#[from] crate::io::Error),
}

impl Error {
    /// Creates a [`MissingField`](Error::MissingField) error.
    pub fn missing_field(field: &'static str, context: impl Into<String>) -> Self {
        Self::MissingField {
            field,
            context: context.into(),
        }
    }

    /// Creates an [`InvalidField`](Error::InvalidField) error.
    pub fn invalid_field(field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            detail: detail.into(),
        }
    }

    /// Creates a [`NotFound`](Error::NotFound) error.
    pub fn not_found(kind: EntityKind, label: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            label: label.into(),
        }
    }
}
