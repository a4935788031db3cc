use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Generates the initial orientation of each integrated particle.
pub trait OrientationStrategy {
    /// Returns a 4-vector `[s, x, y, z]` in the engine's quaternion layout.
    fn orientation(&self, rng: &mut dyn RngCore) -> [f64; 4];
}

/// Selects an [`OrientationStrategy`] from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationKind {
    /// [`ZeroScalar`]: a unit direction with the scalar part fixed at zero.
    #[default]
    ZeroScalar,
    /// [`UnitQuaternion`]: uniformly distributed rotations.
    UnitQuaternion,
}

impl OrientationKind {
    pub fn strategy(self) -> Box<dyn OrientationStrategy> {
        match self {
            OrientationKind::ZeroScalar => Box::new(ZeroScalar),
            OrientationKind::UnitQuaternion => Box::new(UnitQuaternion),
        }
    }
}

/// Unit direction drawn from the positive octant, embedded as `[0, x, y, z]`.
///
/// This is not a uniformly random rotation. Existing trajectories were
/// started this way, so it stays the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroScalar;

impl OrientationStrategy for ZeroScalar {
    fn orientation(&self, rng: &mut dyn RngCore) -> [f64; 4] {
        loop {
            let v: [f64; 3] = [rng.random(), rng.random(), rng.random()];
            let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            if norm > f64::EPSILON {
                return [0.0, v[0] / norm, v[1] / norm, v[2] / norm];
            }
        }
    }
}

/// Uniformly distributed unit quaternion (Shoemake's subgroup algorithm).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitQuaternion;

impl OrientationStrategy for UnitQuaternion {
    fn orientation(&self, rng: &mut dyn RngCore) -> [f64; 4] {
        let u1: f64 = rng.random();
        let u2: f64 = rng.random();
        let u3: f64 = rng.random();
        let a = (1.0 - u1).sqrt();
        let b = u1.sqrt();
        [
            b * (TAU * u3).cos(),
            a * (TAU * u2).sin(),
            a * (TAU * u2).cos(),
            b * (TAU * u3).sin(),
        ]
    }
}
