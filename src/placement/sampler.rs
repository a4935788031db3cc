use crate::config::PlacementSettings;
use crate::error::Error;
use crate::model::sim_box::SimBox;
use rand::Rng;

/// Rejection sampler for particle positions inside a [`SimBox`].
///
/// Random candidates are integer lattice points drawn uniformly per axis from
/// the half-open range `[ceil(-L/2), ceil(L/2))`, matching the engine's
/// periodic box where `+L/2` is the same plane as `-L/2`. A candidate collides with an earlier particle
/// when their distance is at most `min_distance`; a non-positive
/// `min_distance` disables the test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placer {
    pub min_distance: f64,
    pub max_iterations: usize,
}

impl Placer {
    pub fn new(min_distance: f64, max_iterations: usize) -> Self {
        Self {
            min_distance,
            max_iterations,
        }
    }

    pub fn from_settings(settings: &PlacementSettings) -> Self {
        Self::new(settings.min_distance, settings.max_iterations)
    }

    /// Places the next particle after `placed`.
    ///
    /// A `fixed` position is tested once and a collision is fatal. Otherwise
    /// up to `max_iterations` random candidates are drawn.
    pub fn place<R: Rng + ?Sized>(
        &self,
        sim_box: &SimBox,
        placed: &[[f64; 3]],
        fixed: Option<[f64; 3]>,
        rng: &mut R,
    ) -> Result<[f64; 3], Error> {
        let index = placed.len();

        if let Some(position) = fixed {
            return match self.collision(placed, position) {
                Some(other) => Err(Error::FixedPlacementCollision {
                    index,
                    other,
                    position,
                }),
                None => Ok(position),
            };
        }

        let bounds = sim_box.lengths().map(axis_bounds);
        for attempt in 1..=self.max_iterations {
            let candidate = bounds.map(|(lo, hi)| rng.random_range(lo..hi) as f64);
            if self.collision(placed, candidate).is_none() {
                log::debug!("particle {index} placed at {candidate:?} on attempt {attempt}");
                return Ok(candidate);
            }
        }

        Err(Error::PlacementExhausted {
            index,
            attempts: self.max_iterations,
        })
    }

    /// Index of the first placed particle within `min_distance` of `position`.
    fn collision(&self, placed: &[[f64; 3]], position: [f64; 3]) -> Option<usize> {
        if self.min_distance <= 0.0 {
            return None;
        }
        placed
            .iter()
            .position(|other| distance(other, &position) <= self.min_distance)
    }
}

/// Half-open integer range `lo..hi` inside an axis of length `length`.
fn axis_bounds(length: f64) -> (i64, i64) {
    let lo = (-length / 2.0).ceil() as i64;
    let hi = (length / 2.0).ceil() as i64;
    (lo, hi.max(lo + 1))
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
