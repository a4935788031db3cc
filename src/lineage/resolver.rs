use super::source::DocumentSource;
use crate::error::Error;
use crate::io::{Action, BaseSpec, Document, SimulationSpec};
use crate::model::interaction::Interaction;
use crate::model::particle::Particle;
use crate::model::registry::EntityRegistry;
use crate::model::rigidbody::RigidBody;
use crate::model::simulation::{RunParameters, SimData, Simulation};
use std::path::{Path, PathBuf};

/// Turns configuration documents into fully built [`Simulation`]s.
///
/// RUN documents are built from their own sections. CONTINUE and FORK
/// documents name a `base` project file, which is resolved recursively from
/// the ancestor store and then extended or branched. Ancestor chains are
/// tracked, so a document that appears twice in its own ancestry fails with
/// [`Error::LineageCycle`] instead of recursing forever.
#[derive(Debug, Clone)]
pub struct Resolver<S> {
    source: S,
    simulations_dir: PathBuf,
}

impl<S: DocumentSource> Resolver<S> {
    pub fn new(source: S, simulations_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            simulations_dir: simulations_dir.into(),
        }
    }

    pub fn simulations_dir(&self) -> &Path {
        &self.simulations_dir
    }

    /// Loads `file` from the primary location and resolves it.
    pub fn resolve_file(&self, file: &str) -> Result<Simulation, Error> {
        let document = self.source.primary(file)?;
        self.resolve(&document, file)
    }

    /// Resolves an already loaded document; `origin` names it in errors.
    pub fn resolve(&self, document: &Document, origin: &str) -> Result<Simulation, Error> {
        let mut chain = Vec::new();
        let sim = self.resolve_in(document, origin, &mut chain)?;
        log::info!(
            "resolved {origin}: {} '{}' with {} integrated particles",
            sim.mode(),
            sim.project,
            sim.particle_count()
        );
        Ok(sim)
    }

    fn resolve_in(
        &self,
        document: &Document,
        origin: &str,
        chain: &mut Vec<String>,
    ) -> Result<Simulation, Error> {
        match document.action.unwrap_or_default() {
            Action::Run => self.build_run(document, origin),
            Action::Continue => self.build_continue(document, origin, chain),
            Action::Fork => self.build_fork(document, origin, chain),
        }
    }

    fn ancestor(&self, file: &str, chain: &mut Vec<String>) -> Result<Simulation, Error> {
        if chain.iter().any(|seen| seen == file) {
            let mut cycle = chain.clone();
            cycle.push(file.to_string());
            return Err(Error::LineageCycle { chain: cycle });
        }
        log::debug!("loading ancestor {file}");
        chain.push(file.to_string());
        let document = self.source.ancestor(file)?;
        let sim = self.resolve_in(&document, file, chain)?;
        chain.pop();
        Ok(sim)
    }

    fn build_continue(
        &self,
        document: &Document,
        origin: &str,
        chain: &mut Vec<String>,
    ) -> Result<Simulation, Error> {
        let base = base_reference(document, origin)?;
        let duration = required_duration(document, origin)?;
        if base.frame.is_some_and(|frame| frame != -1) {
            log::warn!(
                "{origin}: continuations resume from the last frame; base.frame is ignored"
            );
        }

        let mut sim = self.ancestor(&base.file, chain)?;
        sim.set_continuation_of(SimData::last_frame(base.file.clone()), duration)?;
        Ok(sim)
    }

    fn build_fork(
        &self,
        document: &Document,
        origin: &str,
        chain: &mut Vec<String>,
    ) -> Result<Simulation, Error> {
        let base = base_reference(document, origin)?;
        let project = document
            .project_name
            .clone()
            .ok_or_else(|| Error::missing_field("project_name", origin))?;
        let duration = required_duration(document, origin)?;

        let mut sim = self.ancestor(&base.file, chain)?;
        let frame = base.frame.unwrap_or(-1);
        sim.set_forked_from(SimData::new(base.file.clone(), frame), duration)?;
        sim.project = project;

        // Seed stays with the ancestor.
        if let Some(spec) = &document.simulation {
            if let Some(kt) = spec.kt {
                sim.kt = kt;
            }
            if let Some(dt) = spec.dt {
                sim.dt = dt;
            }
        }
        Ok(sim)
    }

    fn build_run(&self, document: &Document, origin: &str) -> Result<Simulation, Error> {
        let project = document
            .project_name
            .clone()
            .ok_or_else(|| Error::missing_field("project_name", origin))?;
        let sim_box = document
            .sim_box
            .ok_or_else(|| Error::missing_field("box", origin))?;

        let entities = read_entities(document, origin)?;

        let spec = document
            .simulation
            .as_ref()
            .ok_or_else(|| Error::missing_field("simulation", origin))?;
        let params = run_parameters(spec, origin)?;

        let interactions: Vec<Interaction> = entities.interactions.iter().cloned().collect();
        let mut sim = Simulation::new(project, params, sim_box, entities, &self.simulations_dir);

        for instance in &spec.rigidbodies {
            if let Some(position) = instance.fixed_position {
                if instance.count == 1 {
                    sim.entities.rigid_bodies.get_mut(&instance.label)?.fixed_position =
                        Some(position);
                } else {
                    log::warn!(
                        "{origin}: fixed_position of '{}' ignored, it applies only to a single instance (count is {})",
                        instance.label,
                        instance.count
                    );
                }
            }
            sim.add_rigid_body(&instance.label, instance.count)?;
        }
        for solvent in spec.solvent.iter().flatten() {
            sim.add_solvent(&solvent.label, solvent.value)?;
        }
        for interaction in interactions {
            sim.register_interaction(interaction);
        }
        Ok(sim)
    }
}

fn base_reference<'a>(document: &'a Document, origin: &str) -> Result<&'a BaseSpec, Error> {
    document
        .base
        .as_ref()
        .ok_or_else(|| Error::missing_field("base", origin))
}

fn required_duration(document: &Document, origin: &str) -> Result<u64, Error> {
    document
        .simulation
        .as_ref()
        .and_then(|spec| spec.duration)
        .ok_or_else(|| Error::missing_field("duration", format!("{origin} (simulation)")))
}

fn run_parameters(spec: &SimulationSpec, origin: &str) -> Result<RunParameters, Error> {
    let context = || format!("{origin} (simulation)");
    let period = spec
        .period
        .ok_or_else(|| Error::missing_field("period", context()))?;
    if period == 0 {
        return Err(Error::invalid_field(
            "period",
            "frames must be recorded at least every step",
        ));
    }
    Ok(RunParameters {
        kt: spec.kt.ok_or_else(|| Error::missing_field("kT", context()))?,
        dt: spec.dt.ok_or_else(|| Error::missing_field("dt", context()))?,
        period,
        duration: spec
            .duration
            .ok_or_else(|| Error::missing_field("duration", context()))?,
        seed: spec
            .seed
            .ok_or_else(|| Error::missing_field("seed", context()))?,
    })
}

/// Builds the particle catalog, rigid body templates, and interactions.
fn read_entities(document: &Document, origin: &str) -> Result<EntityRegistry, Error> {
    let mut entities = EntityRegistry::new();

    let particles = document
        .particles
        .as_ref()
        .ok_or_else(|| Error::missing_field("particles", origin))?;
    for entry in particles {
        let spec = &entry.value;
        entities
            .particles
            .add(Particle::new(&entry.label, spec.q, spec.m, spec.diam))?;
    }

    let templates = document
        .rigidbodies
        .as_ref()
        .ok_or_else(|| Error::missing_field("rigidbodies", origin))?;
    for template in templates {
        let mut body = RigidBody::new(&template.label);
        for member in &template.value {
            let particle = entities.particles.get(&member.label)?;
            body.add_member(particle, member.value.position, member.value.is_center);
        }
        body.validate()?;
        entities.rigid_bodies.add(body)?;
    }

    let declarations = document
        .interactions
        .as_ref()
        .ok_or_else(|| Error::missing_field("interactions", origin))?;
    for declaration in declarations {
        let spec = &declaration.value;
        let partners = spec.with.clone().into_vec();
        for interaction in Interaction::fan_out(
            &declaration.label,
            &partners,
            spec.epsilon,
            spec.sigma,
            spec.alpha,
        ) {
            entities.interactions.add(interaction)?;
        }
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_document;
    use crate::lineage::source::MemoryDocuments;
    use crate::model::registry::EntityKind;
    use crate::model::simulation::SimulationMode;

    const RUN_DOC: &str = r#"
project_name: propeller
box: {Lx: 20, Ly: 20, Lz: 20}
particles:
  - C: {q: 0, m: 1, diam: 1}
  - A: {q: -1, m: 1, diam: 1}
  - S: {q: 1}
rigidbodies:
  - prop:
      - C: {position: [0, 0, 0], is_center: true}
      - A: {position: [-1.5, 0, 0]}
      - A: {position: [1.5, 0, 0]}
interactions:
  - A: {with: [A, C], epsilon: 1.0, sigma: 1.0, alpha: 0.0}
  - S: {with: S, epsilon: 0.5, sigma: 1.0, alpha: 0.0}
simulation:
  rigidbodies:
    - prop: 3
  solvent:
    - S: 5
  kT: 1.0
  dt: 0.005
  period: 100
  seed: 7
  duration: 1000
"#;

    const BASE_FILE: &str = "propeller_20240101_000000.yaml";

    fn doc(yaml: &str) -> Document {
        parse_document(yaml).unwrap()
    }

    fn resolver(source: MemoryDocuments) -> Resolver<MemoryDocuments> {
        Resolver::new(source, "/sims")
    }

    fn with_base() -> MemoryDocuments {
        let mut source = MemoryDocuments::new();
        source.insert_ancestor(BASE_FILE, doc(RUN_DOC));
        source
    }

    #[test]
    fn run_document_builds_full_simulation() {
        let sim = resolver(MemoryDocuments::new())
            .resolve(&doc(RUN_DOC), "run.yaml")
            .unwrap();

        assert_eq!(sim.mode(), &SimulationMode::Run);
        assert_eq!(sim.project, "propeller");
        assert_eq!(sim.entities.particles.labels(), vec!["C", "A", "S"]);
        assert_eq!(sim.entities.interactions.labels(), vec!["A-A", "A-C", "S-S"]);
        assert_eq!(sim.interactions().len(), 3);
        assert_eq!(sim.count_center_particles(), 3);
        assert_eq!(sim.count_solvents(), 5);
        assert_eq!(sim.entities.particles.get("S").unwrap().mass, 1.0);
        assert_eq!(sim.total_duration(), 1000);
        assert!(!sim.is_minted());
        assert_eq!(sim.simulations_dir(), Path::new("/sims"));

        let prop = sim.entities.rigid_bodies.get("prop").unwrap();
        let inertia = prop.moment_of_inertia().unwrap();
        assert!((inertia[0] - 4.6).abs() < 1e-12);
    }

    #[test]
    fn run_requires_each_section() {
        let r = resolver(MemoryDocuments::new());
        for key in ["project_name", "box", "particles", "rigidbodies", "interactions"] {
            let mut d = doc(RUN_DOC);
            match key {
                "project_name" => d.project_name = None,
                "box" => d.sim_box = None,
                "particles" => d.particles = None,
                "rigidbodies" => d.rigidbodies = None,
                _ => d.interactions = None,
            }
            match r.resolve(&d, "run.yaml") {
                Err(Error::MissingField { field, .. }) => assert_eq!(field, key),
                other => panic!("{key}: expected MissingField, got {other:?}"),
            }
        }
    }

    #[test]
    fn run_requires_physical_parameters() {
        let mut d = doc(RUN_DOC);
        d.simulation.as_mut().unwrap().seed = None;
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&d, "run.yaml"),
            Err(Error::MissingField { field: "seed", .. })
        ));

        let mut d = doc(RUN_DOC);
        d.simulation.as_mut().unwrap().period = Some(0);
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&d, "run.yaml"),
            Err(Error::InvalidField { field: "period", .. })
        ));
    }

    #[test]
    fn unknown_member_particle_is_not_found() {
        let yaml = RUN_DOC.replace("- C: {position: [0, 0, 0]", "- Z: {position: [0, 0, 0]");
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&doc(&yaml), "run.yaml"),
            Err(Error::NotFound { kind: EntityKind::Particle, .. })
        ));
    }

    #[test]
    fn template_without_single_center_is_rejected() {
        let none = RUN_DOC.replace(", is_center: true", "");
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&doc(&none), "run.yaml"),
            Err(Error::NoCenterParticle(_))
        ));

        let two = RUN_DOC.replace(
            "- A: {position: [1.5, 0, 0]}",
            "- A: {position: [1.5, 0, 0], is_center: true}",
        );
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&doc(&two), "run.yaml"),
            Err(Error::MultipleCenterParticles { count: 2, .. })
        ));
    }

    #[test]
    fn duplicate_catalog_label_is_rejected() {
        let yaml = RUN_DOC.replace("  - S: {q: 1}", "  - S: {q: 1}\n  - S: {q: 2}");
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&doc(&yaml), "run.yaml"),
            Err(Error::DuplicateLabel { kind: EntityKind::Particle, .. })
        ));
    }

    #[test]
    fn fixed_position_applies_only_to_single_instance() {
        let single = RUN_DOC.replace(
            "    - prop: 3",
            "    - prop: 1\n      fixed_position: [1, 2, 3]",
        );
        let sim = resolver(MemoryDocuments::new())
            .resolve(&doc(&single), "run.yaml")
            .unwrap();
        assert_eq!(
            sim.entities.rigid_bodies.get("prop").unwrap().fixed_position,
            Some([1.0, 2.0, 3.0])
        );

        let many = RUN_DOC.replace(
            "    - prop: 3",
            "    - prop: 3\n      fixed_position: [1, 2, 3]",
        );
        let sim = resolver(MemoryDocuments::new())
            .resolve(&doc(&many), "run.yaml")
            .unwrap();
        assert!(!sim.entities.rigid_bodies.get("prop").unwrap().is_fixed());
    }

    #[test]
    fn continuation_extends_ancestor() {
        let cont = doc(&format!(
            "action: continue\nbase: {{file: {BASE_FILE}}}\nsimulation: {{duration: 500}}\n"
        ));
        let sim = resolver(with_base()).resolve(&cont, "cont.yaml").unwrap();

        assert_eq!(
            sim.mode(),
            &SimulationMode::Continue(SimData::new(BASE_FILE, 9))
        );
        assert_eq!(sim.project_filename().unwrap(), BASE_FILE);
        assert_eq!(sim.start_from(), 9);
        assert_eq!(sim.previous_duration(), 1000);
        assert_eq!(sim.total_duration(), 1500);
        assert_eq!(sim.count_center_particles(), 3);
    }

    #[test]
    fn fork_branches_with_overrides() {
        let fork = doc(&format!(
            "action: fork\nproject_name: branch\nbase: {{file: {BASE_FILE}, frame: 4}}\nsimulation: {{duration: 200, kT: 2.5, seed: 99}}\n"
        ));
        let sim = resolver(with_base()).resolve(&fork, "fork.yaml").unwrap();

        assert_eq!(sim.mode(), &SimulationMode::Fork(SimData::new(BASE_FILE, 4)));
        assert_eq!(sim.project, "branch");
        assert_eq!(sim.total_duration(), 200);
        assert_eq!(sim.kt, 2.5);
        assert_eq!(sim.dt, 0.005);
        assert_eq!(sim.seed, 7);
        assert!(!sim.is_minted());
        assert_eq!(
            sim.base_trajectory().unwrap(),
            Path::new("/sims/propeller_20240101_000000.gsd")
        );
    }

    #[test]
    fn lineage_documents_require_base_duration_and_fork_name() {
        let r = resolver(with_base());

        let no_base = doc("action: continue\nsimulation: {duration: 5}\n");
        assert!(matches!(
            r.resolve(&no_base, "c.yaml"),
            Err(Error::MissingField { field: "base", .. })
        ));

        let no_duration = doc(&format!("action: continue\nbase: {{file: {BASE_FILE}}}\n"));
        assert!(matches!(
            r.resolve(&no_duration, "c.yaml"),
            Err(Error::MissingField { field: "duration", .. })
        ));

        let unnamed_fork = doc(&format!(
            "action: fork\nbase: {{file: {BASE_FILE}}}\nsimulation: {{duration: 5}}\n"
        ));
        assert!(matches!(
            r.resolve(&unnamed_fork, "f.yaml"),
            Err(Error::MissingField { field: "project_name", .. })
        ));
    }

    #[test]
    fn fork_frame_beyond_ancestor_is_out_of_bounds() {
        let fork = doc(&format!(
            "action: fork\nproject_name: b\nbase: {{file: {BASE_FILE}, frame: 11}}\nsimulation: {{duration: 5}}\n"
        ));
        assert!(matches!(
            resolver(with_base()).resolve(&fork, "f.yaml"),
            Err(Error::OutOfBounds { frame: 11, frames: 10 })
        ));
    }

    #[test]
    fn missing_ancestor_propagates_io_error() {
        let cont = doc("action: continue\nbase: {file: gone_20240101_000000.yaml}\nsimulation: {duration: 5}\n");
        assert!(matches!(
            resolver(MemoryDocuments::new()).resolve(&cont, "c.yaml"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn cyclic_lineage_fails_fast() {
        let a = "a_20240101_000000.yaml";
        let b = "b_20240101_000000.yaml";
        let mut source = MemoryDocuments::new();
        source.insert_ancestor(
            a,
            doc(&format!("action: continue\nbase: {{file: {b}}}\nsimulation: {{duration: 5}}\n")),
        );
        source.insert_ancestor(
            b,
            doc(&format!(
                "action: fork\nproject_name: b\nbase: {{file: {a}}}\nsimulation: {{duration: 5}}\n"
            )),
        );

        let start = doc(&format!(
            "action: continue\nbase: {{file: {a}}}\nsimulation: {{duration: 5}}\n"
        ));
        match resolver(source).resolve(&start, "start.yaml") {
            Err(Error::LineageCycle { chain }) => assert_eq!(chain, vec![a, b, a]),
            other => panic!("expected LineageCycle, got {other:?}"),
        }
    }

    #[test]
    fn written_document_resolves_to_same_graph() {
        let r = resolver(MemoryDocuments::new());
        let mut original = r.resolve(&doc(RUN_DOC), "run.yaml").unwrap();
        original.try_mint();

        let written = Document::from_simulation(&original).unwrap();
        assert!(written.action.is_none());
        let back = r.resolve(&written, "written.yaml").unwrap();

        assert_eq!(
            back.entities.rigid_bodies.labels(),
            original.entities.rigid_bodies.labels()
        );
        assert_eq!(back.interactions(), original.interactions());
        assert_eq!(back.rigid_body_counts(), original.rigid_body_counts());
        assert_eq!(back.solvent_counts(), original.solvent_counts());
        assert_eq!(back.total_duration(), original.total_duration());
        assert_eq!(back.type_labels().unwrap(), original.type_labels().unwrap());
    }

    #[test]
    fn resolve_file_reads_primary_location() {
        let mut source = MemoryDocuments::new();
        source.insert_primary("run.yaml", doc(RUN_DOC));
        let r = resolver(source);
        assert!(r.resolve_file("run.yaml").is_ok());
        assert!(matches!(r.resolve_file("other.yaml"), Err(Error::Io(_))));
    }
}
