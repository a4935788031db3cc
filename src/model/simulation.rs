use super::interaction::Interaction;
use super::particle::Particle;
use super::registry::{EntityKind, EntityRegistry};
use super::rigidbody::RigidBody;
use super::sim_box::SimBox;
use crate::error::Error;
use chrono::{Local, NaiveDateTime, TimeZone};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Unix second of the most recent mint in this process.
static LAST_MINTED: AtomicI64 = AtomicI64::new(0);

/// Pointer to an ancestor run: its project file and a frame of its trajectory.
///
/// A frame of `-1` means "the last recorded frame".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimData {
    pub file: String,
    pub frame: i64,
}

impl SimData {
    pub fn new(file: impl Into<String>, frame: i64) -> Self {
        Self {
            file: file.into(),
            frame,
        }
    }

    pub fn last_frame(file: impl Into<String>) -> Self {
        Self::new(file, -1)
    }
}

/// How a simulation relates to earlier runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SimulationMode {
    /// A fresh run with its own identity.
    #[default]
    Run,
    /// Extends an earlier run, sharing its identity and trajectory.
    Continue(SimData),
    /// Branches a new run from a frame of an earlier trajectory.
    Fork(SimData),
}

impl SimulationMode {
    pub fn name(&self) -> &'static str {
        match self {
            SimulationMode::Run => "run",
            SimulationMode::Continue(_) => "continue",
            SimulationMode::Fork(_) => "fork",
        }
    }

    /// Whether this mode gets a freshly minted identity.
    pub fn mints(&self) -> bool {
        matches!(self, SimulationMode::Run | SimulationMode::Fork(_))
    }
}

impl fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wall-clock identity stamp of a run, formatted `YYYYMMDD_HHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    /// Mints a new stamp from local time.
    ///
    /// Stamps are unique and strictly increasing within a process: when the
    /// clock has not advanced past the previous mint, the next second is used.
    pub fn now() -> Self {
        let now = Local::now().timestamp();
        let mut last = LAST_MINTED.load(Ordering::Relaxed);
        let secs = loop {
            let candidate = now.max(last + 1);
            match LAST_MINTED.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(actual) => last = actual,
            }
        };
        let stamp = Local
            .timestamp_opt(secs, 0)
            .earliest()
            .unwrap_or_else(Local::now);
        Self(stamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn parse(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
            .ok()
            .map(|_| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical and control parameters of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParameters {
    pub kt: f64,
    pub dt: f64,
    /// Steps between recorded frames.
    pub period: u64,
    /// Steps this run integrates.
    pub duration: u64,
    pub seed: u64,
}

/// How many copies of a template or solvent type a simulation contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceCount {
    pub label: String,
    pub count: u64,
}

/// Aggregate root of one run: parameters, contents, lineage, and identity.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub project: String,
    pub kt: f64,
    pub dt: f64,
    pub period: u64,
    pub seed: u64,
    pub sim_box: SimBox,
    pub entities: EntityRegistry,
    rigid_bodies: Vec<InstanceCount>,
    solvents: Vec<InstanceCount>,
    interactions: Vec<Interaction>,
    duration: u64,
    previous_duration: u64,
    start_from: u64,
    mode: SimulationMode,
    timestamp: Option<Timestamp>,
    base_trajectory: Option<PathBuf>,
    simulations_dir: PathBuf,
}

impl Simulation {
    pub fn new(
        project: impl Into<String>,
        params: RunParameters,
        sim_box: SimBox,
        entities: EntityRegistry,
        simulations_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project: project.into(),
            kt: params.kt,
            dt: params.dt,
            period: params.period,
            seed: params.seed,
            sim_box,
            entities,
            rigid_bodies: Vec::new(),
            solvents: Vec::new(),
            interactions: Vec::new(),
            duration: params.duration,
            previous_duration: 0,
            start_from: 0,
            mode: SimulationMode::Run,
            timestamp: None,
            base_trajectory: None,
            simulations_dir: simulations_dir.into(),
        }
    }

    pub fn add_rigid_body(&mut self, label: &str, count: u64) -> Result<(), Error> {
        self.entities.rigid_bodies.get(label)?;
        self.rigid_bodies.push(InstanceCount {
            label: label.to_string(),
            count,
        });
        Ok(())
    }

    pub fn add_solvent(&mut self, label: &str, count: u64) -> Result<(), Error> {
        self.entities.particles.get(label)?;
        self.solvents.push(InstanceCount {
            label: label.to_string(),
            count,
        });
        Ok(())
    }

    pub fn register_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    #[inline]
    pub fn rigid_body_counts(&self) -> &[InstanceCount] {
        &self.rigid_bodies
    }

    #[inline]
    pub fn solvent_counts(&self) -> &[InstanceCount] {
        &self.solvents
    }

    #[inline]
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Rigid body templates paired with their instance counts, in declaration order.
    pub fn rigid_bodies(&self) -> Result<Vec<(&RigidBody, u64)>, Error> {
        self.rigid_bodies
            .iter()
            .map(|c| Ok((self.entities.rigid_bodies.get(&c.label)?, c.count)))
            .collect()
    }

    /// Solvent particle types paired with their instance counts.
    pub fn solvents(&self) -> Result<Vec<(&Particle, u64)>, Error> {
        self.solvents
            .iter()
            .map(|c| Ok((self.entities.particles.get(&c.label)?, c.count)))
            .collect()
    }

    pub fn count_center_particles(&self) -> u64 {
        self.rigid_bodies.iter().map(|c| c.count).sum()
    }

    pub fn count_solvents(&self) -> u64 {
        self.solvents.iter().map(|c| c.count).sum()
    }

    /// Number of integrated particles: one per rigid body instance plus solvent.
    pub fn particle_count(&self) -> u64 {
        self.count_center_particles() + self.count_solvents()
    }

    pub fn has_solvent(&self) -> bool {
        self.count_solvents() > 0
    }

    /// Templates used by this simulation, deduplicated by label.
    pub fn unique_rigid_bodies(&self) -> Result<Vec<&RigidBody>, Error> {
        let mut unique: Vec<&RigidBody> = Vec::new();
        for (rb, _) in self.rigid_bodies()? {
            if !unique.contains(&rb) {
                unique.push(rb);
            }
        }
        Ok(unique)
    }

    /// Every particle type in play: rigid body members first, then solvents.
    pub fn unique_particles(&self) -> Result<Vec<&Particle>, Error> {
        let mut unique: Vec<&Particle> = Vec::new();
        for rb in self.unique_rigid_bodies()? {
            for p in rb.members() {
                if !unique.contains(&p) {
                    unique.push(p);
                }
            }
        }
        for (sol, _) in self.solvents()? {
            if !unique.contains(&sol) {
                unique.push(sol);
            }
        }
        Ok(unique)
    }

    /// Type table handed to the engine.
    pub fn type_labels(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .unique_particles()?
            .into_iter()
            .map(|p| p.label.clone())
            .collect())
    }

    /// Labels of the particles the engine integrates directly.
    ///
    /// Rigid body centers and solvents; satellite members are rebuilt from
    /// the templates and are not part of this set.
    pub fn keep_labels(&self) -> Result<Vec<String>, Error> {
        let mut labels: Vec<String> = Vec::new();
        for rb in self.unique_rigid_bodies()? {
            let label = &rb.center()?.label;
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        for c in &self.solvents {
            if !labels.contains(&c.label) {
                labels.push(c.label.clone());
            }
        }
        Ok(labels)
    }

    #[inline]
    pub fn mode(&self) -> &SimulationMode {
        &self.mode
    }

    pub fn continuation_of(&self) -> Option<&SimData> {
        match &self.mode {
            SimulationMode::Continue(simd) => Some(simd),
            _ => None,
        }
    }

    pub fn forked_from(&self) -> Option<&SimData> {
        match &self.mode {
            SimulationMode::Fork(simd) => Some(simd),
            _ => None,
        }
    }

    #[inline]
    pub fn duration(&self) -> u64 {
        self.duration
    }

    #[inline]
    pub fn previous_duration(&self) -> u64 {
        self.previous_duration
    }

    #[inline]
    pub fn total_duration(&self) -> u64 {
        self.previous_duration + self.duration
    }

    #[inline]
    pub fn start_from(&self) -> u64 {
        self.start_from
    }

    pub fn base_trajectory(&self) -> Option<&Path> {
        self.base_trajectory.as_deref()
    }

    pub fn simulations_dir(&self) -> &Path {
        &self.simulations_dir
    }

    /// Number of frames recorded over the whole run so far.
    pub fn frame_count(&self) -> u64 {
        if self.period == 0 {
            return 0;
        }
        self.total_duration() / self.period
    }

    /// Sets the frame to start from, resolving `-1` to the last recorded frame.
    pub fn set_frame(&mut self, frame: i64) -> Result<u64, Error> {
        let frames = self.frame_count();
        let resolved = if frame == -1 {
            frames as i64 - 1
        } else {
            frame
        };
        if resolved < 0 || resolved as u64 > frames {
            return Err(Error::OutOfBounds { frame, frames });
        }
        self.start_from = resolved as u64;
        Ok(self.start_from)
    }

    /// Turns this (ancestor) simulation into a continuation of itself.
    ///
    /// Resumes from the last recorded frame, takes over the identity encoded
    /// in `ancestor.file`, and runs `extra_duration` more steps on top of
    /// what was already run.
    pub fn set_continuation_of(
        &mut self,
        mut ancestor: SimData,
        extra_duration: u64,
    ) -> Result<(), Error> {
        let frame = self.set_frame(-1)?;
        self.set_project_file(&ancestor.file)?;
        self.previous_duration += self.duration;
        self.duration = extra_duration;
        ancestor.frame = frame as i64;
        self.mode = SimulationMode::Continue(ancestor);
        Ok(())
    }

    /// Turns this (ancestor) simulation into a fork starting at `ancestor.frame`.
    ///
    /// The fork reads the ancestor's trajectory, drops the ancestor's
    /// identity (it must be minted anew), and starts its own duration count.
    pub fn set_forked_from(&mut self, mut ancestor: SimData, new_duration: u64) -> Result<(), Error> {
        let frame = self.set_frame(ancestor.frame)?;
        let trajectory = Path::new(&ancestor.file).with_extension("gsd");
        self.base_trajectory = Some(self.simulations_dir.join(trajectory));
        self.previous_duration = 0;
        self.duration = new_duration;
        self.timestamp = None;
        ancestor.frame = frame as i64;
        self.mode = SimulationMode::Fork(ancestor);
        Ok(())
    }

    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    #[inline]
    pub fn is_minted(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Assigns a fresh identity.
    pub fn mint(&mut self) -> &Timestamp {
        let stamp = Timestamp::now();
        log::info!("minted {}_{}", self.project, stamp);
        self.timestamp.insert(stamp)
    }

    /// Mints for runs and forks; continuations keep the inherited identity.
    pub fn try_mint(&mut self) -> Option<&Timestamp> {
        if self.mode.mints() {
            Some(self.mint())
        } else {
            self.timestamp.as_ref()
        }
    }

    /// Adopts the identity encoded in a `{project}_{date}_{time}.yaml` file name.
    pub fn set_project_file(&mut self, file: &str) -> Result<(), Error> {
        let (project, timestamp) = parse_project_file(file)?;
        self.project = project;
        self.timestamp = Some(timestamp);
        Ok(())
    }

    fn artifact_name(&self, extension: &str) -> Result<String, Error> {
        let timestamp = self
            .timestamp
            .as_ref()
            .ok_or_else(|| Error::NotMinted(self.project.clone()))?;
        Ok(format!("{}_{}.{}", self.project, timestamp, extension))
    }

    pub fn project_filename(&self) -> Result<String, Error> {
        self.artifact_name("yaml")
    }

    pub fn project_file(&self) -> Result<PathBuf, Error> {
        Ok(self.simulations_dir.join(self.project_filename()?))
    }

    pub fn log_filename(&self) -> Result<String, Error> {
        self.artifact_name("log")
    }

    pub fn log_file(&self) -> Result<PathBuf, Error> {
        Ok(self.simulations_dir.join(self.log_filename()?))
    }

    pub fn trajectory_filename(&self) -> Result<String, Error> {
        self.artifact_name("gsd")
    }

    pub fn trajectory_file(&self) -> Result<PathBuf, Error> {
        Ok(self.simulations_dir.join(self.trajectory_filename()?))
    }

    /// Trajectory the starting configuration is read from, if any.
    ///
    /// Continuations resume their own (shared) trajectory; forks read the
    /// ancestor's.
    pub fn source_trajectory(&self) -> Result<Option<PathBuf>, Error> {
        match &self.mode {
            SimulationMode::Run => Ok(None),
            SimulationMode::Continue(_) => self.trajectory_file().map(Some),
            SimulationMode::Fork(simd) => self
                .base_trajectory
                .clone()
                .map(Some)
                .ok_or_else(|| Error::missing_field("base_trajectory", simd.file.clone())),
        }
    }

    /// Looks up a particle type by label among the types in play.
    pub fn particle(&self, label: &str) -> Result<&Particle, Error> {
        self.unique_particles()?
            .into_iter()
            .find(|p| p.label == label)
            .ok_or_else(|| Error::not_found(EntityKind::Particle, label))
    }
}

fn parse_project_file(file: &str) -> Result<(String, Timestamp), Error> {
    let invalid = || Error::InvalidProjectFile(file.to_string());
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;

    let mut parts = stem.rsplitn(3, '_');
    let time = parts.next().ok_or_else(invalid)?;
    let date = parts.next().ok_or_else(invalid)?;
    let project = parts.next().filter(|p| !p.is_empty()).ok_or_else(invalid)?;

    let timestamp = Timestamp::parse(&format!("{date}_{time}")).ok_or_else(invalid)?;
    Ok((project.to_string(), timestamp))
}
