use anyhow::Result;

use crate::Context as DisplayContext;
use crate::cli::InspectArgs;
use crate::display::{Progress, print_entities, print_lineage, print_run_summary};
use crate::io::read_settings;

const TOTAL_STEPS: u8 = 2;

pub fn run_inspect(args: InspectArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Loading settings");
    let settings = read_settings(args.common.settings.as_deref())?;
    progress.complete_step(
        "Loading settings",
        &[format!("Working directory: {}", settings.paths.workdir.display())],
    );

    progress.step("Resolving configuration");
    let sim = super::resolve(&args.common, &settings)?;
    progress.complete_step(
        "Resolving configuration",
        &[format!("Mode: {}", sim.mode())],
    );

    print_run_summary(&sim);
    print_lineage(&sim);
    print_entities(&sim);

    progress.finish("Inspect complete");

    Ok(())
}
