//! Hand-off to the external MD engine.
//!
//! A [`RunPlan`] gathers everything the engine needs to integrate one run:
//! the starting snapshot, rigid constraints, pair coefficients, long-range
//! electrostatics, integrator settings, outputs, and the number of steps.
//! Nothing here integrates; the plan is serialized and handed over.

use crate::error::Error;
use crate::io;
use crate::model::simulation::{Simulation, SimulationMode};
use crate::placement::Snapshot;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// Cutoff of the pair potential.
pub const PAIR_CUTOFF: f64 = 6.0;
/// PPPM mesh points per axis.
pub const PPPM_GRID: u32 = 64;
pub const PPPM_ORDER: u32 = 4;
pub const PPPM_CUTOFF: f64 = 6.0;
/// Thermodynamic quantities written to the log file every period.
pub const LOGGED_QUANTITIES: [&str; 3] = [
    "potential_energy",
    "translational_kinetic_energy",
    "rotational_kinetic_energy",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    pub project: String,
    pub mode: String,
    pub snapshot: Snapshot,
    pub rigid: Vec<RigidConstraint>,
    pub pair: PairPotential,
    pub electrostatics: Electrostatics,
    pub integrator: Integrator,
    pub output: Output,
    /// Steps to integrate in this run.
    pub steps: u64,
}

/// Satellite layout the engine rebuilds around each center particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidConstraint {
    pub center: String,
    pub types: Vec<String>,
    pub positions: Vec<[f64; 3]>,
    pub charges: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPotential {
    pub r_cut: f64,
    pub coefficients: Vec<PairCoefficient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairCoefficient {
    pub a: String,
    pub b: String,
    pub epsilon: f64,
    pub sigma: f64,
    pub alpha: f64,
}

/// PPPM parameters applied to all charged particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electrostatics {
    pub grid: [u32; 3],
    pub order: u32,
    pub r_cut: f64,
    pub alpha: f64,
}

impl Default for Electrostatics {
    fn default() -> Self {
        Self {
            grid: [PPPM_GRID; 3],
            order: PPPM_ORDER,
            r_cut: PPPM_CUTOFF,
            alpha: 0.0,
        }
    }
}

/// Langevin integrator over the rigid centers and solvent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integrator {
    pub dt: f64,
    #[serde(rename = "kT")]
    pub kt: f64,
    pub seed: u64,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub log_file: PathBuf,
    pub trajectory_file: PathBuf,
    pub period: u64,
    pub quantities: Vec<String>,
    /// False for continuations, which append to the shared log and trajectory.
    pub overwrite: bool,
}

impl RunPlan {
    /// Builds the plan for a minted simulation and its starting snapshot.
    pub fn new(sim: &Simulation, snapshot: Snapshot) -> Result<Self, Error> {
        let rigid = sim
            .unique_rigid_bodies()?
            .into_iter()
            .map(|body| -> Result<RigidConstraint, Error> {
                let satellites: Vec<_> = body.non_center().collect();
                Ok(RigidConstraint {
                    center: body.center()?.label.clone(),
                    types: satellites.iter().map(|p| p.label.clone()).collect(),
                    positions: satellites.iter().map(|p| p.position).collect(),
                    charges: satellites.iter().map(|p| p.charge).collect(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let coefficients = sim
            .interactions()
            .iter()
            .map(|i| PairCoefficient {
                a: i.p1_label.clone(),
                b: i.p2_label.clone(),
                epsilon: i.epsilon,
                sigma: i.sigma,
                alpha: i.alpha,
            })
            .collect();

        let output = Output {
            log_file: sim.log_file()?,
            trajectory_file: sim.trajectory_file()?,
            period: sim.period,
            quantities: LOGGED_QUANTITIES.iter().map(|q| q.to_string()).collect(),
            overwrite: !matches!(sim.mode(), SimulationMode::Continue(_)),
        };

        Ok(Self {
            project: sim.project.clone(),
            mode: sim.mode().name().to_string(),
            snapshot,
            rigid,
            pair: PairPotential {
                r_cut: PAIR_CUTOFF,
                coefficients,
            },
            electrostatics: Electrostatics::default(),
            integrator: Integrator {
                dt: sim.dt,
                kt: sim.kt,
                seed: sim.seed,
                groups: sim.keep_labels()?,
            },
            output,
            steps: sim.duration(),
        })
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), io::Error> {
        Ok(serde_yaml::to_writer(writer, self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_document;
    use crate::lineage::{MemoryDocuments, Resolver};
    use crate::model::simulation::SimData;

    const DOC: &str = r#"
project_name: duo
box: {Lx: 20, Ly: 20, Lz: 20}
particles:
  - C: {q: 0.5}
  - A: {q: -1}
  - S: {q: 1}
rigidbodies:
  - prop:
      - C: {position: [0, 0, 0], is_center: true}
      - A: {position: [-1.5, 0, 0]}
      - A: {position: [1.5, 0, 0]}
interactions:
  - A: {with: [A, S], epsilon: 1.0, sigma: 1.0, alpha: 0.5}
simulation:
  rigidbodies:
    - prop: 2
  solvent:
    - S: 3
  kT: 1.2
  dt: 0.004
  period: 50
  seed: 3
  duration: 500
"#;

    fn simulation() -> Simulation {
        let resolver = Resolver::new(MemoryDocuments::new(), "/sims");
        resolver
            .resolve(&parse_document(DOC).unwrap(), "duo.yaml")
            .unwrap()
    }

    fn empty_snapshot(sim: &Simulation) -> Snapshot {
        Snapshot {
            sim_box: sim.sim_box,
            types: sim.type_labels().unwrap(),
            particles: Vec::new(),
        }
    }

    #[test]
    fn plan_requires_minted_identity() {
        let sim = simulation();
        let snapshot = empty_snapshot(&sim);
        assert!(matches!(
            RunPlan::new(&sim, snapshot),
            Err(Error::NotMinted(_))
        ));
    }

    #[test]
    fn plan_collects_engine_inputs() {
        let mut sim = simulation();
        sim.try_mint();
        let plan = RunPlan::new(&sim, empty_snapshot(&sim)).unwrap();

        assert_eq!(plan.mode, "run");
        assert_eq!(plan.rigid.len(), 1);
        assert_eq!(plan.rigid[0].center, "C");
        assert_eq!(plan.rigid[0].types, vec!["A", "A"]);
        assert_eq!(plan.rigid[0].positions[1], [1.5, 0.0, 0.0]);
        assert_eq!(plan.rigid[0].charges, vec![-1.0, -1.0]);

        assert_eq!(plan.pair.r_cut, 6.0);
        assert_eq!(plan.pair.coefficients.len(), 2);
        assert_eq!(plan.pair.coefficients[1].b, "S");
        assert_eq!(plan.electrostatics.grid, [64, 64, 64]);
        assert_eq!(plan.electrostatics.order, 4);

        assert_eq!(plan.integrator.kt, 1.2);
        assert_eq!(plan.integrator.groups, vec!["C", "S"]);
        assert_eq!(plan.output.period, 50);
        assert_eq!(plan.output.quantities.len(), 3);
        assert!(plan.output.overwrite);
        assert_eq!(plan.output.trajectory_file, sim.trajectory_file().unwrap());
        assert_eq!(plan.steps, 500);
    }

    #[test]
    fn continuation_appends_and_runs_extra_steps() {
        let mut sim = simulation();
        sim.set_continuation_of(SimData::last_frame("duo_20240101_000000.yaml"), 200)
            .unwrap();
        sim.try_mint();
        let plan = RunPlan::new(&sim, empty_snapshot(&sim)).unwrap();

        assert_eq!(plan.mode, "continue");
        assert!(!plan.output.overwrite);
        assert_eq!(plan.steps, 200);
        assert_eq!(
            plan.output.log_file,
            PathBuf::from("/sims/duo_20240101_000000.log")
        );
    }

    #[test]
    fn plan_serializes_to_yaml() {
        let mut sim = simulation();
        sim.try_mint();
        let plan = RunPlan::new(&sim, empty_snapshot(&sim)).unwrap();
        let mut out = Vec::new();
        plan.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("kT: 1.2"));
        let back: RunPlan = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, plan);
    }
}
