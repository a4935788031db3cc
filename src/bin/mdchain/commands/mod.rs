mod inspect;
mod prepare;

use inspect::run_inspect;
use prepare::run_prepare;

use anyhow::{Context, Result};

use mdchain::lineage::{FsDocumentSource, Resolver};
use mdchain::{Settings, Simulation};

use crate::cli::{Command, CommonOptions};
use crate::Context as DisplayContext;

pub fn dispatch(command: Command, ctx: DisplayContext) -> Result<()> {
    match command {
        Command::Inspect(args) => run_inspect(args, ctx),
        Command::Prepare(args) => run_prepare(args, ctx),
    }
}

/// Resolves the configuration named on the command line.
///
/// An existing path is read directly; anything else is a file name looked
/// up in the configured working directory.
fn resolve(common: &CommonOptions, settings: &Settings) -> Result<Simulation> {
    let source = FsDocumentSource::from_settings(&settings.paths);
    let resolver = Resolver::new(source, &settings.paths.simulations_dir);

    let config = &common.config;
    if config.is_file() {
        let origin = config
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.display().to_string());
        let document = mdchain::io::load_document(config)
            .with_context(|| format!("Failed to load configuration: {}", config.display()))?;
        Ok(resolver.resolve(&document, &origin)?)
    } else {
        let name = config.to_string_lossy();
        Ok(resolver.resolve_file(&name)?)
    }
}
