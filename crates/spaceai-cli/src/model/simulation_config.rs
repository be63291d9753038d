use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use spaceai_engine::ArenaConfig;
use spaceai_pilot::pilot::PilotConfig;
use spaceai_training::config::EvolutionConfig;

use crate::util;

/// Everything a simulation run is parameterized by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub arena: ArenaConfig,
    pub evolution: EvolutionConfig,
}

impl SimulationConfig {
    /// Reads and validates a config file.
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let config: Self = util::read_json_file("simulation config", path)?;
        config
            .validate()
            .with_context(|| format!("Invalid simulation config: {}", path.display()))?;
        Ok(config)
    }

    /// The config at `path`, or the defaults if no path is given.
    pub fn open_or_default<P>(path: Option<P>) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        match path {
            Some(path) => Self::open(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.arena.validate().context("Invalid arena config")?;
        self.evolution
            .validate()
            .context("Invalid evolution config")?;
        Ok(())
    }

    #[must_use]
    pub fn pilot_config(&self) -> PilotConfig {
        self.evolution.pilot_config(&self.arena)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "evolution": { "population_size": 40 } }"#).unwrap();

        let config = SimulationConfig::open(&path).unwrap();
        assert_eq!(config.evolution.population_size, 40);
        assert_eq!(config.evolution.selection_rate, 0.1);
        assert_eq!(config.arena, ArenaConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "evolution": { "selection_rate": 0.001 } }"#).unwrap();

        let err = SimulationConfig::open(&path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid simulation config"));
    }

    #[test]
    fn test_missing_path_uses_defaults() {
        let config = SimulationConfig::open_or_default(None::<&Path>).unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.pilot_config().screen_width, 640.0);
    }
}
