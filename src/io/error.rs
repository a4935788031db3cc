use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to access '{}': {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("no trajectory recorded at '{}'", .0.display())]
    MissingTrajectory(PathBuf),

    #[error("frame {frame} is beyond the {frames} frames recorded in '{}'", path.display())]
    FrameOutOfRange {
        path: PathBuf,
        frame: usize,
        frames: usize,
    },
}

impl Error {
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
