//! Runtime settings: where documents and artifacts live and how particles
//! are placed.
//!
//! Defaults are embedded from `resources/default.settings.toml`. A custom
//! TOML string may override any subset of keys; missing keys fall back to
//! the same defaults.
//!
//! ```
//! use mdchain::{Settings, load_settings};
//!
//! let custom = r#"
//!     [paths]
//!     simulations_dir = "/scratch/sims"
//!
//!     [placement]
//!     min_distance = 2.5
//! "#;
//! let settings = load_settings(Some(custom))?;
//! assert_eq!(settings.paths.simulations_dir.to_str(), Some("/scratch/sims"));
//! assert_eq!(settings.placement.min_distance, 2.5);
//! assert_eq!(settings.placement.max_iterations, 1000);
//! # Ok::<(), mdchain::io::Error>(())
//! ```

use crate::io::Error;
use crate::placement::OrientationKind;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../resources/default.settings.toml");

static DEFAULT_SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub placement: PlacementSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    /// Directory primary documents are read from.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Directory holding ancestor documents and every run artifact.
    #[serde(default = "default_simulations_dir")]
    pub simulations_dir: PathBuf,
    #[serde(default = "default_ledger_file")]
    pub ledger_file: PathBuf,
}

fn default_workdir() -> PathBuf {
    PathBuf::from("/hoomd-examples/workdir/new")
}
fn default_simulations_dir() -> PathBuf {
    PathBuf::from("/hoomd-examples/workdir/new/simulations")
}
fn default_ledger_file() -> PathBuf {
    PathBuf::from("/hoomd-examples/workdir/new/current_files.txt")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            simulations_dir: default_simulations_dir(),
            ledger_file: default_ledger_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacementSettings {
    /// Minimum center-to-center separation; non-positive disables the check.
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,
    /// Attempts per particle before placement gives up.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub orientation: OrientationKind,
}

fn default_min_distance() -> f64 {
    4.0
}
fn default_max_iterations() -> usize {
    1000
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_iterations: default_max_iterations(),
            orientation: OrientationKind::default(),
        }
    }
}

pub fn load_settings(custom_toml: Option<&str>) -> Result<Settings, Error> {
    match custom_toml {
        Some(toml) => Ok(toml::from_str(toml)?),
        None => Ok(default_settings().clone()),
    }
}

pub fn default_settings() -> &'static Settings {
    DEFAULT_SETTINGS.get_or_init(|| {
        toml::from_str(DEFAULT_SETTINGS_TOML)
            .expect("Failed to parse embedded default settings. This is a library bug.")
    })
}
