//! Exchange with the outside world: configuration documents, recorded
//! trajectories, and the per-GPU ledger.

mod document;
mod error;
mod ledger;
mod trajectory;

pub use document::{
    Action, BaseSpec, Document, InstanceSpec, InteractionSpec, Labeled, MemberSpec, ParticleSpec,
    Partners, SimulationSpec, parse_document, read_document, write_document,
};
pub use error::Error;
pub use ledger::Ledger;
pub use trajectory::{
    Frame, MemoryTrajectories, ParticleState, TrajectorySource, read_frames, write_frames,
};

use crate::model::simulation::Simulation;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Reads a configuration document from disk.
pub fn load_document(path: &Path) -> Result<Document, Error> {
    let file = File::open(path).map_err(|e| Error::file(path, e))?;
    read_document(BufReader::new(file))
}

/// Writes `sim` as a configuration document to `path`.
pub fn save_simulation(sim: &Simulation, path: &Path) -> Result<(), crate::Error> {
    let document = Document::from_simulation(sim)?;
    let file = File::create(path).map_err(|e| Error::file(path, e))?;
    let mut writer = BufWriter::new(file);
    write_document(&mut writer, &document)?;
    writer.flush().map_err(Error::from)?;
    Ok(())
}
