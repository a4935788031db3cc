use super::particle::Particle;
use crate::error::Error;

/// A labeled cluster of particles moving as one rigid object.
///
/// The body owns its own copies of every member, each with its offset from
/// the body origin and a center flag. Exactly one member is the center; it
/// is the particle the engine integrates, while the others are regenerated
/// from the template by the engine's rigid constraint.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub label: String,
    members: Vec<Particle>,
    pub fixed_position: Option<[f64; 3]>,
}

impl RigidBody {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: Vec::new(),
            fixed_position: None,
        }
    }

    /// Adds a copy of `particle` placed at `position` relative to the body origin.
    pub fn add_member(&mut self, particle: &Particle, position: [f64; 3], is_center: bool) {
        let mut member = particle.copy_type();
        member.position = position;
        member.is_center = is_center;
        self.members.push(member);
    }

    #[inline]
    pub fn members(&self) -> &[Particle] {
        &self.members
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed_position.is_some()
    }

    pub fn center(&self) -> Result<&Particle, Error> {
        self.members
            .iter()
            .find(|p| p.is_center)
            .ok_or_else(|| Error::NoCenterParticle(self.label.clone()))
    }

    pub fn non_center(&self) -> impl Iterator<Item = &Particle> {
        self.members.iter().filter(|p| !p.is_center)
    }

    /// Checks that exactly one member is flagged as the center.
    pub fn validate(&self) -> Result<(), Error> {
        match self.members.iter().filter(|p| p.is_center).count() {
            0 => Err(Error::NoCenterParticle(self.label.clone())),
            1 => Ok(()),
            count => Err(Error::MultipleCenterParticles {
                label: self.label.clone(),
                count,
            }),
        }
    }

    /// Member types in first-seen order, deduplicated by label.
    pub fn unique_particles(&self) -> Vec<&Particle> {
        let mut unique: Vec<&Particle> = Vec::new();
        for p in &self.members {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        unique
    }

    pub fn mass(&self) -> f64 {
        self.members.iter().map(|p| p.mass).sum()
    }

    pub fn center_of_mass(&self) -> [f64; 3] {
        let mass = self.mass();
        let mut com = [0.0; 3];
        for p in &self.members {
            for (c, x) in com.iter_mut().zip(p.position) {
                *c += p.mass * x;
            }
        }
        com.map(|c| c / mass)
    }

    /// Per-axis moment of inertia.
    ///
    /// The center contributes a solid sphere term `0.4 m r²` on every axis;
    /// each other member contributes `m (com - x)²` element-wise. This is a
    /// diagonal approximation, not the full inertia tensor.
    pub fn moment_of_inertia(&self) -> Result<[f64; 3], Error> {
        let center = self.center()?;
        let sphere = 0.4 * center.radius().powi(2) * center.mass;
        let mut inertia = [sphere; 3];

        let com = self.center_of_mass();
        for p in self.non_center() {
            for axis in 0..3 {
                inertia[axis] += p.mass * (com[axis] - p.position[axis]).powi(2);
            }
        }
        Ok(inertia)
    }
}

impl PartialEq for RigidBody {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}
