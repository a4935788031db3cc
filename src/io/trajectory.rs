//! Read access to recorded trajectories.
//!
//! Trajectory storage belongs to the engine; the core only needs to read a
//! frame by index. [`TrajectorySource`] is that seam. [`MemoryTrajectories`]
//! serves frames held in memory, typically loaded from a YAML frame export
//! with [`read_frames`].

use super::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// State of one particle as recorded by, or handed to, the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    pub type_id: usize,
    pub position: [f64; 3],
    pub charge: f64,
    pub diameter: f64,
    pub orientation: [f64; 4],
    pub moment_inertia: [f64; 3],
}

/// One recorded frame: a type table and the particles referencing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub types: Vec<String>,
    pub particles: Vec<ParticleState>,
}

impl Frame {
    /// Type label of particle `index`, if both the particle and its type exist.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        let particle = self.particles.get(index)?;
        self.types.get(particle.type_id).map(String::as_str)
    }
}

pub trait TrajectorySource {
    /// Number of frames recorded in the trajectory at `path`.
    fn frame_count(&self, path: &Path) -> Result<usize, Error>;

    fn read_frame(&self, path: &Path, index: usize) -> Result<Frame, Error>;
}

/// Trajectories held in memory, keyed by the path they stand in for.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrajectories {
    trajectories: HashMap<PathBuf, Vec<Frame>>,
}

impl MemoryTrajectories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, frames: Vec<Frame>) {
        self.trajectories.insert(path.into(), frames);
    }

    fn frames(&self, path: &Path) -> Result<&[Frame], Error> {
        self.trajectories
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::MissingTrajectory(path.to_path_buf()))
    }
}

impl TrajectorySource for MemoryTrajectories {
    fn frame_count(&self, path: &Path) -> Result<usize, Error> {
        Ok(self.frames(path)?.len())
    }

    fn read_frame(&self, path: &Path, index: usize) -> Result<Frame, Error> {
        let frames = self.frames(path)?;
        frames
            .get(index)
            .cloned()
            .ok_or_else(|| Error::FrameOutOfRange {
                path: path.to_path_buf(),
                frame: index,
                frames: frames.len(),
            })
    }
}

pub fn read_frames<R: Read>(reader: R) -> Result<Vec<Frame>, Error> {
    Ok(serde_yaml::from_reader(reader)?)
}

pub fn write_frames<W: Write>(writer: W, frames: &[Frame]) -> Result<(), Error> {
    Ok(serde_yaml::to_writer(writer, frames)?)
}
