//! Evolution parameters.
//!
//! All parameters are fixed for the lifetime of a [`Population`](crate::population::Population).
//! Defaults match the game's stock settings.

use serde::{Deserialize, Serialize};
use spaceai_engine::ArenaConfig;
use spaceai_pilot::pilot::PilotConfig;

/// How a child genotype is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationPolicy {
    /// Replace the whole genotype with freshly sampled parameters.
    Reinitialize,
    /// Multiply every parameter by one factor drawn from `[1 - scale, 1 + scale]`.
    ScaleWeights { scale: f32 },
}

/// Value used to rank pilots during selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKey {
    /// Episode score plus stay bonus.
    #[default]
    Fitness,
    /// Raw episode score only.
    DeathScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of ships per generation (must be greater than 5).
    pub population_size: usize,
    /// Fraction of the population carried forward unchanged, in `(0, 1)`.
    pub selection_rate: f64,
    /// Probability that a child is mutated, in `[0, 1]`.
    pub mutation_prob: f64,
    pub mutation_policy: MutationPolicy,
    pub selection_key: SelectionKey,
    /// Target fraction of "stay" decisions for the stay bonus, in `(0, 1)`.
    pub stay_frac: f32,
    /// Hidden-layer width of every pilot.
    pub neurons: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            selection_rate: 0.1,
            mutation_prob: 0.2,
            mutation_policy: MutationPolicy::Reinitialize,
            selection_key: SelectionKey::Fitness,
            stay_frac: 0.5,
            neurons: 8,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be greater than 5, got {size}")]
    PopulationTooSmall { size: usize },
    #[display("selection rate must be in (0, 1), got {rate}")]
    SelectionRateOutOfRange { rate: f64 },
    #[display("selection rate {rate} keeps no survivors out of {size} ships")]
    NoSurvivors { rate: f64, size: usize },
    #[display("mutation probability must be in [0, 1], got {prob}")]
    MutationProbOutOfRange { prob: f64 },
    #[display("mutation scale must be in [0, 1], got {scale}")]
    MutationScaleOutOfRange { scale: f32 },
    #[display("stay fraction must be in (0, 1), got {frac}")]
    StayFracOutOfRange { frac: f32 },
    #[display("hidden layer must have at least one neuron")]
    NoNeurons,
}

impl EvolutionConfig {
    /// Number of survivors kept per generation: `floor(selection_rate * population_size)`.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn survivor_count(&self) -> usize {
        (self.selection_rate * self.population_size as f64).floor() as usize
    }

    /// Pilot parameters derived from this configuration and the arena.
    #[must_use]
    pub fn pilot_config(&self, arena: &ArenaConfig) -> PilotConfig {
        PilotConfig {
            neurons: self.neurons,
            stay_frac: self.stay_frac,
            screen_width: arena.screen_width,
        }
    }

    /// Checks every parameter range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size <= 5 {
            return Err(ConfigError::PopulationTooSmall {
                size: self.population_size,
            });
        }
        if !(self.selection_rate > 0.0 && self.selection_rate < 1.0) {
            return Err(ConfigError::SelectionRateOutOfRange {
                rate: self.selection_rate,
            });
        }
        if self.survivor_count() == 0 {
            return Err(ConfigError::NoSurvivors {
                rate: self.selection_rate,
                size: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.mutation_prob) {
            return Err(ConfigError::MutationProbOutOfRange {
                prob: self.mutation_prob,
            });
        }
        match self.mutation_policy {
            MutationPolicy::ScaleWeights { scale } if !(0.0..=1.0).contains(&scale) => {
                return Err(ConfigError::MutationScaleOutOfRange { scale });
            }
            _ => {}
        }
        if !(self.stay_frac > 0.0 && self.stay_frac < 1.0) {
            return Err(ConfigError::StayFracOutOfRange {
                frac: self.stay_frac,
            });
        }
        if self.neurons == 0 {
            return Err(ConfigError::NoNeurons);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EvolutionConfig::default();
        config.validate().unwrap();
        assert_eq!(config.survivor_count(), 20);
    }

    #[test]
    fn test_survivor_count_floors() {
        let config = |population_size, selection_rate| EvolutionConfig {
            population_size,
            selection_rate,
            ..EvolutionConfig::default()
        };
        assert_eq!(config(10, 0.3).survivor_count(), 3);
        assert_eq!(config(5, 0.4).survivor_count(), 2);
        assert_eq!(config(9, 0.5).survivor_count(), 4);
        assert_eq!(config(10, 0.7).survivor_count(), 7);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let base = EvolutionConfig::default();
        let cases = [
            EvolutionConfig {
                population_size: 5,
                ..base
            },
            EvolutionConfig {
                selection_rate: 1.0,
                ..base
            },
            EvolutionConfig {
                population_size: 6,
                selection_rate: 0.1,
                ..base
            },
            EvolutionConfig {
                mutation_prob: 1.5,
                ..base
            },
            EvolutionConfig {
                mutation_policy: MutationPolicy::ScaleWeights { scale: -0.1 },
                ..base
            },
            EvolutionConfig {
                stay_frac: 0.0,
                ..base
            },
            EvolutionConfig { neurons: 0, ..base },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_no_survivors_error_message() {
        let config = EvolutionConfig {
            population_size: 6,
            selection_rate: 0.1,
            ..EvolutionConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "selection rate 0.1 keeps no survivors out of 6 ships"
        );
    }

    #[test]
    fn test_deserialize_with_policy() {
        let config: EvolutionConfig = serde_json::from_str(
            r#"{
                "population_size": 50,
                "mutation_policy": { "kind": "scale_weights", "scale": 0.2 },
                "selection_key": "death_score"
            }"#,
        )
        .unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(
            config.mutation_policy,
            MutationPolicy::ScaleWeights { scale: 0.2 }
        );
        assert_eq!(config.selection_key, SelectionKey::DeathScore);
        assert_eq!(config.neurons, 8);
        config.validate().unwrap();
    }

    #[test]
    fn test_pilot_config_uses_arena_width() {
        let arena = ArenaConfig {
            screen_width: 800.0,
            spawn_x: 400.0,
            ..ArenaConfig::default()
        };
        let pilot = EvolutionConfig::default().pilot_config(&arena);
        assert_eq!(pilot.screen_width, 800.0);
        assert_eq!(pilot.neurons, 8);
    }
}
