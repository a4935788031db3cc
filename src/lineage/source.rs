use crate::config::PathSettings;
use crate::io::{self, Document};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where configuration documents come from.
///
/// Primary documents are the ones a user asks to resolve; ancestor
/// documents are earlier project files named by a `base` reference.
pub trait DocumentSource {
    fn primary(&self, file: &str) -> Result<Document, io::Error>;

    fn ancestor(&self, file: &str) -> Result<Document, io::Error>;
}

/// Reads primary documents from a working directory and ancestors from the
/// simulations directory.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    workdir: PathBuf,
    simulations_dir: PathBuf,
}

impl FsDocumentSource {
    pub fn new(workdir: impl Into<PathBuf>, simulations_dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            simulations_dir: simulations_dir.into(),
        }
    }

    pub fn from_settings(paths: &PathSettings) -> Self {
        Self::new(&paths.workdir, &paths.simulations_dir)
    }

    pub fn simulations_dir(&self) -> &Path {
        &self.simulations_dir
    }
}

impl DocumentSource for FsDocumentSource {
    fn primary(&self, file: &str) -> Result<Document, io::Error> {
        io::load_document(&self.workdir.join(file))
    }

    fn ancestor(&self, file: &str) -> Result<Document, io::Error> {
        io::load_document(&self.simulations_dir.join(file))
    }
}

/// Documents held in memory, split the same way as on disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocuments {
    primaries: HashMap<String, Document>,
    ancestors: HashMap<String, Document>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_primary(&mut self, file: impl Into<String>, document: Document) {
        self.primaries.insert(file.into(), document);
    }

    pub fn insert_ancestor(&mut self, file: impl Into<String>, document: Document) {
        self.ancestors.insert(file.into(), document);
    }
}

fn missing(file: &str) -> io::Error {
    io::Error::file(file, std::io::ErrorKind::NotFound.into())
}

impl DocumentSource for MemoryDocuments {
    fn primary(&self, file: &str) -> Result<Document, io::Error> {
        self.primaries.get(file).cloned().ok_or_else(|| missing(file))
    }

    fn ancestor(&self, file: &str) -> Result<Document, io::Error> {
        self.ancestors.get(file).cloned().ok_or_else(|| missing(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn fs_source_reads_from_the_right_directory() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let sims = dir.path().join("sims");
        fs::create_dir_all(&work).unwrap();
        fs::create_dir_all(&sims).unwrap();
        fs::write(work.join("a.yaml"), "project_name: primary\n").unwrap();
        fs::write(sims.join("a.yaml"), "project_name: ancestor\n").unwrap();

        let source = FsDocumentSource::new(&work, &sims);
        assert_eq!(
            source.primary("a.yaml").unwrap().project_name.as_deref(),
            Some("primary")
        );
        assert_eq!(
            source.ancestor("a.yaml").unwrap().project_name.as_deref(),
            Some("ancestor")
        );
        assert!(matches!(
            source.ancestor("b.yaml"),
            Err(io::Error::File { .. })
        ));
    }

    #[test]
    fn memory_source_keeps_primaries_and_ancestors_apart() {
        let mut source = MemoryDocuments::new();
        source.insert_ancestor("x.yaml", Document::default());
        assert!(source.ancestor("x.yaml").is_ok());
        assert!(source.primary("x.yaml").is_err());
    }
}
