//! Resolution of configuration documents into simulations.
//!
//! A document either describes a fresh run or points at an earlier project
//! file it continues or forks. [`Resolver`] follows those pointers through a
//! [`DocumentSource`] and returns one fully built [`Simulation`].
//!
//! [`Simulation`]: crate::Simulation

mod resolver;
mod source;

pub use resolver::Resolver;
pub use source::{DocumentSource, FsDocumentSource, MemoryDocuments};
