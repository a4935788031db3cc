/// A typed point particle.
///
/// Identity is the label: two particles with the same label are the same
/// type regardless of position or physical attributes, so [`PartialEq`]
/// compares labels only.
#[derive(Debug, Clone)]
pub struct Particle {
    pub label: String,
    pub charge: f64,
    pub mass: f64,
    pub diameter: f64,
    pub position: [f64; 3],
    pub is_center: bool,
}

impl Particle {
    pub fn new(label: impl Into<String>, charge: f64, mass: f64, diameter: f64) -> Self {
        Self {
            label: label.into(),
            charge,
            mass,
            diameter,
            position: [0.0; 3],
            is_center: false,
        }
    }

    /// Copies the type and physical attributes, resetting placement state.
    pub fn copy_type(&self) -> Self {
        Self::new(self.label.clone(), self.charge, self.mass, self.diameter)
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for Particle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_physical_attributes() {
        let a = Particle::new("A", 1.0, 1.0, 1.0);
        let mut b = Particle::new("A", -2.0, 5.0, 3.0);
        b.position = [1.0, 2.0, 3.0];
        b.is_center = true;
        assert_eq!(a, b);
        assert_ne!(a, Particle::new("B", 1.0, 1.0, 1.0));
    }

    #[test]
    fn copy_type_resets_placement() {
        let mut p = Particle::new("A", 1.0, 2.0, 3.0);
        p.position = [4.0, 5.0, 6.0];
        p.is_center = true;

        let copy = p.copy_type();
        assert_eq!(copy.position, [0.0; 3]);
        assert!(!copy.is_center);
        assert_eq!(copy.charge, 1.0);
        assert_eq!(copy.mass, 2.0);
        assert_eq!(copy.diameter, 3.0);
    }

    #[test]
    fn radius_is_half_diameter() {
        assert_eq!(Particle::new("A", 0.0, 1.0, 3.0).radius(), 1.5);
    }
}
