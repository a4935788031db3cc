use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, IsTerminal, StdoutLock, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mdchain::Settings;
use mdchain::io::{Frame, MemoryTrajectories, read_frames};

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Returns `true` if stdout is a terminal (interactive).
pub fn stdout_is_tty() -> bool {
    io::stdout().is_terminal()
}

/// Loads settings from a TOML file, or the embedded defaults.
pub fn read_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("Failed to read settings file: {}", p.display()))?;
            mdchain::load_settings(Some(&text))
                .with_context(|| format!("Invalid settings file: {}", p.display()))
        }
        None => Ok(mdchain::default_settings().clone()),
    }
}

/// Loads an exported frame sequence and registers it under `trajectory`.
pub fn read_trajectory(frames: &Path, trajectory: &Path) -> Result<MemoryTrajectories> {
    let file = File::open(frames)
        .with_context(|| format!("Failed to open frames file: {}", frames.display()))?;
    let recorded: Vec<Frame> = read_frames(BufReader::new(file))
        .with_context(|| format!("Failed to read frames from {}", frames.display()))?;

    let mut trajectories = MemoryTrajectories::new();
    trajectories.insert(trajectory, recorded);
    Ok(trajectories)
}

pub enum OutputTarget {
    File(BufWriter<File>),
    Stdout(BufWriter<StdoutLock<'static>>),
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::File(w) => w.write(buf),
            OutputTarget::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::File(w) => w.flush(),
            OutputTarget::Stdout(w) => w.flush(),
        }
    }
}

pub fn create_output(path: Option<&Path>) -> Result<OutputTarget> {
    match path {
        Some(p) => {
            let file = File::create(p)
                .with_context(|| format!("Failed to create output file: {}", p.display()))?;
            Ok(OutputTarget::File(BufWriter::new(file)))
        }
        None => Ok(OutputTarget::Stdout(BufWriter::new(io::stdout().lock()))),
    }
}
