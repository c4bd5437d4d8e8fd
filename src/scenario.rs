use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::{Predator, Prey, SpeciesTraits};
use crate::population::{DeathPolicy, Population};
use crate::terrain::{BoundaryPolicy, Terrain, TerrainError, Viewport};

/// Longest time step a scenario may ask for, in seconds.
pub const MAX_DT_SECONDS: f32 = 3_600.0;

fn default_seed() -> u64 {
    42
}

fn default_dt_seconds() -> f32 {
    1.0 / 30.0
}

fn default_ticks() -> u64 {
    900
}

fn default_rows() -> usize {
    50
}

fn default_cols() -> usize {
    50
}

fn default_prey() -> usize {
    20
}

fn default_predators() -> usize {
    10
}

fn default_prey_traits() -> SpeciesTraits {
    Prey::DEFAULT_TRAITS
}

fn default_predator_traits() -> SpeciesTraits {
    Predator::DEFAULT_TRAITS
}

fn default_viewport() -> Viewport {
    Viewport::new(800.0, 800.0)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_census_interval() -> u64 {
    60
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_dt_seconds")]
    pub dt_seconds: f32,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub species: SpeciesConfig,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default)]
    pub boundary: BoundaryPolicy,
    /// Chance per tick that a fertile cell grows food.
    #[serde(default)]
    pub regrowth_chance: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            boundary: BoundaryPolicy::default(),
            regrowth_chance: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    #[serde(default = "default_prey")]
    pub prey: usize,
    #[serde(default = "default_predators")]
    pub predators: usize,
    #[serde(default)]
    pub death_policy: DeathPolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            prey: default_prey(),
            predators: default_predators(),
            death_policy: DeathPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    #[serde(default = "default_prey_traits")]
    pub prey: SpeciesTraits,
    #[serde(default = "default_predator_traits")]
    pub predator: SpeciesTraits,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            prey: default_prey_traits(),
            predator: default_predator_traits(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Ticks between census log lines in headless runs, 0 disables them.
    #[serde(default = "default_census_interval")]
    pub census_interval_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            census_interval_ticks: default_census_interval(),
        }
    }
}

impl Default for Scenario {
    /// 50x50 meadow with 20 prey and 10 predators.
    fn default() -> Self {
        Self {
            name: "meadow".to_string(),
            description: None,
            seed: default_seed(),
            dt_seconds: default_dt_seconds(),
            ticks: default_ticks(),
            terrain: TerrainConfig::default(),
            population: PopulationConfig::default(),
            species: SpeciesConfig::default(),
            viewport: default_viewport(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let scenario: Scenario =
            serde_yaml::from_str(text).context("Failed to parse scenario YAML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize scenario")
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.name.trim().is_empty() {
            return Err(ScenarioError::Validation(
                "scenario must define a name".into(),
            ));
        }
        if self.terrain.rows == 0 || self.terrain.cols == 0 {
            return Err(ScenarioError::Validation(format!(
                "terrain must be at least 1x1, got {}x{}",
                self.terrain.rows, self.terrain.cols
            )));
        }
        if !(0.0..=MAX_DT_SECONDS).contains(&self.dt_seconds) {
            return Err(ScenarioError::Validation(format!(
                "dt_seconds must be within [0, {MAX_DT_SECONDS}], got {}",
                self.dt_seconds
            )));
        }
        if !(0.0..=1.0).contains(&self.terrain.regrowth_chance) {
            return Err(ScenarioError::Validation(format!(
                "regrowth_chance must be within [0, 1], got {}",
                self.terrain.regrowth_chance
            )));
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ScenarioError::Validation(format!(
                "viewport must have a positive size, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        for (label, traits) in [
            ("prey", &self.species.prey),
            ("predator", &self.species.predator),
        ] {
            let finite = traits.speed.is_finite()
                && traits.decay_rate.is_finite()
                && traits.feeding_gain.is_finite();
            if !finite || traits.speed < 0.0 || traits.decay_rate < 0.0 {
                return Err(ScenarioError::Validation(format!(
                    "{label} traits must be finite with non-negative speed and decay"
                )));
            }
        }
        Ok(())
    }

    pub fn build_terrain(&self) -> Result<Terrain, TerrainError> {
        Ok(Terrain::new(self.terrain.rows, self.terrain.cols)?
            .with_boundary(self.terrain.boundary)
            .with_regrowth(self.terrain.regrowth_chance))
    }

    pub fn build_population(&self) -> Population {
        Population::new()
            .with_traits(self.species.prey, self.species.predator)
            .with_death_policy(self.population.death_policy)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.unwrap_or(self.ticks)
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}
