use super::sampler::Placer;
use crate::config::PlacementSettings;
use crate::error::Error;
use crate::io::{ParticleState, TrajectorySource};
use crate::model::registry::EntityKind;
use crate::model::sim_box::SimBox;
use crate::model::simulation::{Simulation, SimulationMode};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Starting configuration handed to the engine.
///
/// Holds only the integrated particles: rigid body centers and solvent.
/// Satellite members are rebuilt by the engine's rigid constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "box")]
    pub sim_box: SimBox,
    pub types: Vec<String>,
    pub particles: Vec<ParticleState>,
}

impl Snapshot {
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn label_of(&self, index: usize) -> Option<&str> {
        let particle = self.particles.get(index)?;
        self.types.get(particle.type_id).map(String::as_str)
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.particles.iter().map(|p| p.position)
    }
}

/// Builds the starting configuration for `sim`.
///
/// Fresh runs are placed from scratch; continuations and forks are read
/// back from a recorded frame.
pub fn assemble(
    sim: &Simulation,
    settings: &PlacementSettings,
    trajectories: &dyn TrajectorySource,
) -> Result<Snapshot, Error> {
    match sim.mode() {
        SimulationMode::Run => fresh(sim, settings),
        SimulationMode::Continue(_) | SimulationMode::Fork(_) => {
            from_trajectory(sim, trajectories)
        }
    }
}

/// Places one particle per rigid body instance, then one per solvent.
///
/// All randomness comes from a ChaCha12 stream seeded with `sim.seed`, so
/// the result is reproducible.
pub fn fresh(sim: &Simulation, settings: &PlacementSettings) -> Result<Snapshot, Error> {
    let types = sim.type_labels()?;
    let type_index = |label: &str| {
        types
            .iter()
            .position(|t| t == label)
            .ok_or_else(|| Error::not_found(EntityKind::Particle, label))
    };

    let placer = Placer::from_settings(settings);
    let strategy = settings.orientation.strategy();
    let mut rng = ChaCha12Rng::seed_from_u64(sim.seed);

    let capacity = usize::try_from(sim.particle_count()).unwrap_or(0);
    let mut particles: Vec<ParticleState> = Vec::with_capacity(capacity);
    let mut positions: Vec<[f64; 3]> = Vec::with_capacity(capacity);

    for (body, count) in sim.rigid_bodies()? {
        let center = body.center()?;
        let type_id = type_index(&center.label)?;
        let moment_inertia = body.moment_of_inertia()?;
        for _ in 0..count {
            let orientation = strategy.orientation(&mut rng);
            let position = placer.place(&sim.sim_box, &positions, body.fixed_position, &mut rng)?;
            positions.push(position);
            particles.push(ParticleState {
                type_id,
                position,
                charge: center.charge,
                diameter: center.diameter,
                orientation,
                moment_inertia,
            });
        }
    }

    for (solvent, count) in sim.solvents()? {
        let type_id = type_index(&solvent.label)?;
        for _ in 0..count {
            let orientation = strategy.orientation(&mut rng);
            let position = placer.place(&sim.sim_box, &positions, None, &mut rng)?;
            positions.push(position);
            particles.push(ParticleState {
                type_id,
                position,
                charge: solvent.charge,
                diameter: solvent.diameter,
                orientation,
                moment_inertia: [1.0; 3],
            });
        }
    }

    log::debug!(
        "placed {} particles of {} types for '{}'",
        particles.len(),
        types.len(),
        sim.project
    );
    Ok(Snapshot {
        sim_box: sim.sim_box,
        types,
        particles,
    })
}

/// Reads frame `start_from` of the source trajectory and keeps the
/// particles whose type is in the keep set, in recorded order.
///
/// The recorded type table is kept so type ids stay valid; the box is the
/// current simulation's.
pub fn from_trajectory(
    sim: &Simulation,
    trajectories: &dyn TrajectorySource,
) -> Result<Snapshot, Error> {
    let path = sim
        .source_trajectory()?
        .ok_or_else(|| Error::missing_field("trajectory", sim.project.clone()))?;

    let frames = trajectories.frame_count(&path)?;
    let start = sim.start_from();
    if start >= frames as u64 {
        return Err(Error::OutOfBounds {
            frame: start as i64,
            frames: frames as u64,
        });
    }
    let frame = trajectories.read_frame(&path, start as usize)?;

    let keep = sim.keep_labels()?;
    let particles: Vec<ParticleState> = frame
        .particles
        .iter()
        .enumerate()
        .filter(|(i, _)| frame.label_of(*i).is_some_and(|l| keep.iter().any(|k| k == l)))
        .map(|(_, p)| p.clone())
        .collect();

    log::debug!(
        "kept {} of {} particles from frame {start} of {}",
        particles.len(),
        frame.particles.len(),
        path.display()
    );
    Ok(Snapshot {
        sim_box: sim.sim_box,
        types: frame.types,
        particles,
    })
}
