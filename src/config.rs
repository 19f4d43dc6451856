use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// The 30 seeds every instance is optimised with.
pub const DEFAULT_SEEDS: [u64; 30] = [
    0, 1, 2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
    89, 97, 101, 103, 107,
];

pub const POPULATION_SIZE: usize = 10;
pub const GENERATION_SIZE: usize = 100;
pub const CHECKPOINT_INTERVAL: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("at least one generation is required")]
    NoGenerations,
    #[error("checkpoint interval must be positive")]
    ZeroCheckpointInterval,
    #[error("no seeds to run")]
    NoSeeds,
    #[error("hypervolume reference must be finite, got {0:?}")]
    InvalidReference([f64; 2]),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub population_size: usize,
    pub generations: usize,
    pub seeds: Vec<u64>,
    /// First-front snapshots are taken on generation 1 and every multiple of this.
    pub checkpoint_interval: usize,
    pub output_dir: PathBuf,
    /// Run the seeds of an instance on the rayon pool.
    pub parallel_seeds: bool,
    /// Render PNG gantt charts and front plots next to the CSV output.
    pub render_charts: bool,
    pub hypervolume_reference: [f64; 2],
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE,
            generations: GENERATION_SIZE,
            seeds: DEFAULT_SEEDS.to_vec(),
            checkpoint_interval: CHECKPOINT_INTERVAL,
            output_dir: PathBuf::from("results"),
            parallel_seeds: false,
            render_charts: false,
            hypervolume_reference: [1000.0, 1000.0],
        }
    }
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::ZeroCheckpointInterval);
        }
        if self.seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        if !self.hypervolume_reference.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidReference(self.hypervolume_reference));
        }
        Ok(())
    }

    /// Whether the population after `generation` (0-based) is checkpointed.
    pub fn is_checkpoint(&self, generation: usize) -> bool {
        generation == 0 || (generation + 1) % self.checkpoint_interval == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let config = RunConfig::default();
        assert_eq!(config.population_size, 10);
        assert_eq!(config.generations, 100);
        assert_eq!(config.seeds.len(), 30);
        assert_eq!(config.seeds.last(), Some(&107));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RunConfig::from_toml("population_size = 24\nseeds = [4, 8]\n").unwrap();
        assert_eq!(config.population_size, 24);
        assert_eq!(config.seeds, vec![4, 8]);
        assert_eq!(config.generations, GENERATION_SIZE);
        assert_eq!(config.output_dir, PathBuf::from("results"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            RunConfig::from_toml("population_size = 1"),
            Err(ConfigError::PopulationTooSmall(1))
        ));
        assert!(matches!(RunConfig::from_toml("generations = 0"), Err(ConfigError::NoGenerations)));
        assert!(matches!(RunConfig::from_toml("seeds = []"), Err(ConfigError::NoSeeds)));
        assert!(matches!(RunConfig::from_toml("colour = true"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn checkpoints_on_first_and_every_interval() {
        let config = RunConfig::default();
        let checkpoints: Vec<usize> = (0..100).filter(|&g| config.is_checkpoint(g)).collect();
        assert_eq!(checkpoints, vec![0, 19, 39, 59, 79, 99]);
    }
}
