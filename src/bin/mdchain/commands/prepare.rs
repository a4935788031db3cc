use std::io::Write;

use anyhow::{Context, Result, bail};

use mdchain::io::{Ledger, MemoryTrajectories};
use mdchain::{RunPlan, Settings, Simulation, SimulationMode, assemble};

use crate::Context as DisplayContext;
use crate::cli::PrepareArgs;
use crate::display::{Progress, print_lineage, print_run_summary, print_snapshot_summary};
use crate::io::{create_output, read_settings, read_trajectory, stdout_is_tty};

const TOTAL_STEPS: u8 = 4;

/// Prepares one run.
///
/// Nothing is written until the starting snapshot and run plan are built.
/// The project file (the ancestor's own, for a continuation) and the ledger
/// are updated last.
pub fn run_prepare(args: PrepareArgs, ctx: DisplayContext) -> Result<()> {
    if args.output.is_none() && stdout_is_tty() && ctx.interactive {
        log::warn!("writing the run plan to the terminal; use --output to save it");
    }

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Resolving configuration");
    let settings = read_settings(args.common.settings.as_deref())?;
    let mut sim = super::resolve(&args.common, &settings)?;
    sim.try_mint();
    progress.complete_step(
        "Resolving configuration",
        &[
            format!("Mode: {}", sim.mode()),
            format!("Project file: {}", sim.project_filename()?),
        ],
    );

    if ctx.interactive {
        print_run_summary(&sim);
        print_lineage(&sim);
    }

    progress.step("Assembling starting snapshot");
    let trajectories = match (sim.mode(), args.frames.as_deref()) {
        (SimulationMode::Run, _) => MemoryTrajectories::new(),
        (_, Some(frames)) => {
            let source = sim.source_trajectory()?.with_context(|| {
                format!("{} run has no source trajectory", sim.mode())
            })?;
            read_trajectory(frames, &source)?
        }
        (mode, None) => bail!(
            "A {mode} run starts from a recorded frame.\n\nPass the ancestor's exported frames with --frames <FILE>."
        ),
    };
    let snapshot = assemble(&sim, &settings.placement, &trajectories)
        .context("Failed to assemble the starting snapshot")?;
    progress.complete_step(
        "Assembling starting snapshot",
        &[format!("{} particles, {} types", snapshot.len(), snapshot.types.len())],
    );

    if ctx.interactive {
        print_snapshot_summary(&snapshot);
    }

    progress.step("Writing run plan");
    let plan = RunPlan::new(&sim, snapshot)?;
    let mut rendered = Vec::new();
    plan.write(&mut rendered).context("Failed to render run plan")?;

    let mut output = create_output(args.output.as_deref())?;
    output
        .write_all(&rendered)
        .and_then(|()| output.flush())
        .context("Failed to write run plan")?;

    let target = match &args.output {
        Some(path) => path.display().to_string(),
        None => "stdout".to_string(),
    };
    progress.complete_step(
        "Writing run plan",
        &[format!("{} steps -> {}", plan.steps, target)],
    );

    progress.step("Recording project file");
    let record_substeps = record(&sim, &settings, &args)?;
    progress.complete_step("Recording project file", &record_substeps);

    progress.finish("Prepare complete");

    Ok(())
}

fn record(sim: &Simulation, settings: &Settings, args: &PrepareArgs) -> Result<Vec<String>> {
    let project_file = sim.project_file()?;
    mdchain::io::save_simulation(sim, &project_file)
        .with_context(|| format!("Failed to write project file: {}", project_file.display()))?;

    let mut substeps = vec![format!("Wrote {}", project_file.display())];
    if args.no_ledger {
        substeps.push("Ledger skipped".to_string());
    } else {
        let ledger = Ledger::new(&settings.paths.ledger_file);
        ledger
            .record(args.gpu, &sim.project_filename()?)
            .with_context(|| format!("Failed to update ledger: {}", ledger.path().display()))?;
        substeps.push(format!("GPU {} -> {}", args.gpu, ledger.path().display()));
    }
    Ok(substeps)
}
