use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mdchain::io::{Frame, ParticleState, write_frames};
use tempfile::TempDir;

const ANCESTOR: &str = "p_20240101_000000.yaml";

const ANCESTOR_DOC: &str = r#"project_name: p
box: {Lx: 30, Ly: 30, Lz: 30}
particles:
  - C: {q: 0, m: 1, diam: 1}
  - A: {q: -1, m: 1, diam: 1}
rigidbodies:
  - prop:
      - C: {position: [0, 0, 0], is_center: true}
      - A: {position: [1.5, 0, 0]}
interactions:
  - A: {with: [A, C], epsilon: 1.0, sigma: 1.0, alpha: 0.0}
simulation:
  rigidbodies:
    - prop: 2
  kT: 1.0
  dt: 0.005
  period: 100
  seed: 7
  duration: 1000
"#;

const CONTINUE_DOC: &str = "action: continue\nbase: {file: p_20240101_000000.yaml}\nsimulation: {duration: 500}\n";

struct Setup {
    dir: TempDir,
    sims: PathBuf,
    ledger: PathBuf,
    settings: PathBuf,
}

impl Setup {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        let sims = dir.path().join("sims");
        let ledger = dir.path().join("current_files.txt");
        fs::create_dir_all(&workdir).unwrap();
        fs::create_dir_all(&sims).unwrap();

        let settings = dir.path().join("settings.toml");
        fs::write(
            &settings,
            format!(
                "[paths]\nworkdir = \"{}\"\nsimulations_dir = \"{}\"\nledger_file = \"{}\"\n",
                workdir.display(),
                sims.display(),
                ledger.display()
            ),
        )
        .unwrap();

        fs::write(sims.join(ANCESTOR), ANCESTOR_DOC).unwrap();
        fs::write(workdir.join("cont.yaml"), CONTINUE_DOC).unwrap();

        Self {
            dir,
            sims,
            ledger,
            settings,
        }
    }

    fn ancestor(&self) -> String {
        fs::read_to_string(self.sims.join(ANCESTOR)).unwrap()
    }

    /// Writes `count` recorded frames of two centers and two satellites.
    fn frames(&self, count: usize) -> PathBuf {
        let state = |type_id: usize| ParticleState {
            type_id,
            position: [1.0, 2.0, 3.0],
            charge: 0.0,
            diameter: 1.0,
            orientation: [1.0, 0.0, 0.0, 0.0],
            moment_inertia: [1.0, 1.0, 1.0],
        };
        let frames: Vec<Frame> = (0..count)
            .map(|_| Frame {
                types: vec!["C".into(), "A".into()],
                particles: vec![state(0), state(0), state(1), state(1)],
            })
            .collect();

        let path = self.dir.path().join("frames.yaml");
        write_frames(File::create(&path).unwrap(), &frames).unwrap();
        path
    }

    fn prepare(&self, extra: &[&Path]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mdchain"));
        cmd.current_dir(self.dir.path())
            .arg("prepare")
            .arg("cont.yaml")
            .args(["--gpu", "0", "--quiet", "--settings"])
            .arg(&self.settings);
        for arg in extra {
            cmd.arg(arg);
        }
        cmd.output().unwrap()
    }
}

#[test]
fn continuation_without_frames_leaves_ancestor_and_ledger_untouched() {
    let setup = Setup::new();
    let before = setup.ancestor();

    let out = setup.prepare(&[]);

    assert!(!out.status.success());
    assert_eq!(setup.ancestor(), before);
    assert!(!setup.ledger.exists());
}

#[test]
fn continuation_from_short_trajectory_leaves_ancestor_untouched() {
    let setup = Setup::new();
    let before = setup.ancestor();
    let frames = setup.frames(9);

    let out = setup.prepare(&[Path::new("--frames"), frames.as_path()]);

    assert!(!out.status.success());
    assert_eq!(setup.ancestor(), before);
    assert!(!setup.ledger.exists());
}

#[test]
fn successful_continuation_records_project_and_ledger() {
    let setup = Setup::new();
    let frames = setup.frames(10);
    let plan = setup.dir.path().join("plan.yaml");

    let out = setup.prepare(&[
        Path::new("--frames"),
        frames.as_path(),
        Path::new("-o"),
        plan.as_path(),
    ]);

    assert!(
        out.status.success(),
        "{}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(setup.ancestor().contains("duration: 1500"));
    assert_eq!(fs::read_to_string(&setup.ledger).unwrap(), ANCESTOR);

    let plan = fs::read_to_string(plan).unwrap();
    assert!(plan.contains("mode: continue"));
    assert!(plan.contains("steps: 500"));
}
