//! Per-GPU record of the project file each device is currently running.
//!
//! The ledger is a single line of comma-separated project files, slot `i`
//! belonging to GPU `i`. Empty slots are idle devices.

use super::error::Error;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All slots, in GPU order. A missing ledger file reads as empty.
    pub fn entries(&self) -> Result<Vec<String>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(parse(&raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::file(&self.path, e)),
        }
    }

    pub fn current(&self, gpu: usize) -> Result<Option<String>, Error> {
        Ok(self
            .entries()?
            .into_iter()
            .nth(gpu)
            .filter(|entry| !entry.is_empty()))
    }

    /// Records `file` as the project running on `gpu`.
    pub fn record(&self, gpu: usize, file: &str) -> Result<(), Error> {
        let mut entries = self.entries()?;
        if entries.len() <= gpu {
            entries.resize(gpu + 1, String::new());
        }
        entries[gpu] = file.to_string();
        fs::write(&self.path, entries.join(",")).map_err(|e| Error::file(&self.path, e))?;
        log::debug!("ledger slot {gpu} -> {file}");
        Ok(())
    }
}

fn parse(raw: &str) -> Vec<String> {
    let line = raw.trim_end_matches(['\n', '\r']);
    if line.is_empty() {
        return Vec::new();
    }
    line.split(',').map(|s| s.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_replaces_only_its_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current_files.txt");
        fs::write(&path, "a.yaml,b.yaml,c.yaml").unwrap();

        let ledger = Ledger::new(&path);
        ledger.record(1, "x.yaml").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a.yaml,x.yaml,c.yaml");
        assert_eq!(ledger.current(1).unwrap().as_deref(), Some("x.yaml"));
    }

    #[test]
    fn record_pads_short_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("ledger.txt"));

        ledger.record(2, "p.yaml").unwrap();
        assert_eq!(ledger.entries().unwrap(), vec!["", "", "p.yaml"]);
        assert_eq!(ledger.current(0).unwrap(), None);
        assert_eq!(ledger.current(5).unwrap(), None);
    }
}
