use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    let hints = HintCollector::collect(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

#[derive(Default)]
struct HintCollector {
    hints: Vec<String>,
}

impl HintCollector {
    fn collect(err: &Error) -> Vec<String> {
        let mut collector = Self::default();

        if let Some(core) = err.downcast_ref::<mdchain::Error>() {
            collector.core_hints(core);
        } else if let Some(io_err) = err.downcast_ref::<mdchain::io::Error>() {
            collector.io_hints(io_err);
        } else {
            collector.fallback_hints(err);
        }

        collector.hints
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn core_hints(&mut self, err: &mdchain::Error) {
        use mdchain::Error as E;

        match err {
            E::MissingField { field, .. } => {
                self.add(format!("Add the '{field}' key to the document"));
                match *field {
                    "project_name" => {
                        self.add("Runs and forks need their own project name");
                    }
                    "base" => {
                        self.add("Continue and fork documents name their ancestor under base.file");
                    }
                    "duration" => {
                        self.add("Continue and fork documents must state how many steps to run");
                    }
                    _ => {}
                }
            }

            E::InvalidField { field, .. } => {
                self.add(format!("Check the value given for '{field}'"));
            }

            E::NotFound { kind, label } => {
                self.add(format!("No {kind} is declared with label '{label}'"));
                self.add("Labels are case sensitive; check the particles and rigidbodies sections");
            }

            E::DuplicateLabel { kind, label } => {
                self.add(format!("The {kind} '{label}' is declared more than once"));
                self.add("Rename or remove the duplicate declaration");
            }

            E::TypeMismatch { .. } => {
                self.add("An entity was offered to the wrong registry");
                self.add("This indicates a bug; please report it");
            }

            E::NoCenterParticle(_) | E::MultipleCenterParticles { .. } => {
                self.add("Mark exactly one member of each rigid body with is_center: true");
            }

            E::OutOfBounds { frames, .. } => {
                self.add(format!("The ancestor run records {frames} frames"));
                self.add("Use base.frame between 0 and the last frame, or omit it for the last one");
            }

            E::NotMinted(_) => {
                self.add("Artifact names exist only after the run is minted");
            }

            E::InvalidProjectFile(_) => {
                self.add("Ancestor files are named {project}_{YYYYMMDD}_{HHMMSS}.yaml");
                self.add("Use the project file written when the ancestor was prepared");
            }

            E::PlacementExhausted { .. } => {
                self.add("The box is too crowded for the minimum separation");
                self.add("Enlarge the box, reduce instance counts, or lower placement.min_distance");
                self.add("Raising placement.max_iterations may also help");
            }

            E::FixedPlacementCollision { .. } => {
                self.add("A fixed_position overlaps an earlier particle");
                self.add("Move the fixed body or lower placement.min_distance");
            }

            E::LineageCycle { .. } => {
                self.add("A project file continues or forks from one of its own descendants");
                self.add("Point base.file at an earlier run");
            }

            E::Io(io_err) => self.io_hints(io_err),
        }
    }

    fn io_hints(&mut self, err: &mdchain::io::Error) {
        use mdchain::io::Error as E;

        match err {
            E::Io { source } | E::File { source, .. } => self.std_io_hints(source),

            E::Yaml(_) => {
                self.add("The document is not valid YAML for this schema");
                self.add("Labeled entries are single-key mappings, e.g. '- A: {q: 0}'");
            }

            E::Settings(_) => {
                self.add("The settings file has invalid TOML or unknown values");
                self.add("placement.orientation is zero-scalar or unit-quaternion");
            }

            E::MissingTrajectory(_) => {
                self.add("Continuations and forks start from a recorded frame");
                self.add("Pass the exported frames of the ancestor trajectory with --frames");
            }

            E::FrameOutOfRange { .. } => {
                self.add("The frames file holds fewer frames than the run expects");
            }
        }
    }

    fn std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check paths.workdir and paths.simulations_dir in the settings");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
        } else if msg.contains("permission denied") {
            self.add("Ensure you have the required access rights");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
