use serde::{Deserialize, Serialize};

/// Orthorhombic simulation cell centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimBox {
    #[serde(rename = "Lx")]
    pub lx: f64,
    #[serde(rename = "Ly")]
    pub ly: f64,
    #[serde(rename = "Lz")]
    pub lz: f64,
}

impl SimBox {
    pub fn new(lx: f64, ly: f64, lz: f64) -> Self {
        Self { lx, ly, lz }
    }

    #[inline]
    pub fn lengths(&self) -> [f64; 3] {
        [self.lx, self.ly, self.lz]
    }

    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.lx * self.lx + self.ly * self.ly + self.lz * self.lz).sqrt()
    }
}
