//! The neural controller of a ship.
//!
//! A [`Pilot`] owns one [`Genotype`] and the bookkeeping of the current episode:
//!
//! - a decision histogram, updated on every [`Pilot::decide`] call
//! - the episode score, committed once when its ship crashes
//! - the fitness derived from both, used to rank pilots for selection
//!
//! The genotype never changes during an episode. It is replaced wholesale when the
//! pilot's slot is refilled during reproduction, or when the best genome is loaded
//! from a [`GenomeStore`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use spaceai_engine::{Action, Observation, ShipController};

use crate::{
    activation,
    fitness::{self, DecisionStats},
    genome_store::{GenomeBackend, GenomeStore, GenomeStoreError},
    genotype::Genotype,
};

/// Parameters shared by every pilot of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PilotConfig {
    /// Hidden-layer width (`NEURONS`).
    pub neurons: usize,
    /// Target fraction of "stay" decisions rewarded by the stay bonus.
    pub stay_frac: f32,
    /// Normalization constant for observations.
    pub screen_width: f32,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            neurons: 8,
            stay_frac: 0.5,
            screen_width: 640.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pilot {
    config: PilotConfig,
    genotype: Genotype,
    episode_score: u32,
    fitness: f32,
    decisions: DecisionStats,
}

impl Pilot {
    /// Creates a pilot with a freshly randomized genotype.
    pub fn random<R>(config: PilotConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::with_genotype(config, Genotype::random(rng, config.neurons))
    }

    /// Creates a pilot around an existing genotype.
    ///
    /// # Panics
    ///
    /// Panics if the genotype's hidden width differs from `config.neurons`.
    #[must_use]
    pub fn with_genotype(config: PilotConfig, genotype: Genotype) -> Self {
        assert_eq!(genotype.neurons(), config.neurons);
        Self {
            config,
            genotype,
            episode_score: 0,
            fitness: 0.0,
            decisions: DecisionStats::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PilotConfig {
        &self.config
    }

    #[must_use]
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    /// Score committed when the ship died (0 while it is alive).
    #[must_use]
    pub fn episode_score(&self) -> u32 {
        self.episode_score
    }

    /// Fitness of the last finished episode.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[must_use]
    pub fn decisions(&self) -> &DecisionStats {
        &self.decisions
    }

    /// Output-unit probabilities for an observation, in [`Action`] index order.
    #[must_use]
    pub fn action_probabilities(&self, observation: &Observation) -> Vec<f32> {
        let input = observation.to_array().map(|v| v / self.config.screen_width);
        let output = self.genotype.forward(&input);
        activation::softmax(&output).expect("output layer has one unit per action")
    }

    /// Chooses an action without touching the episode statistics.
    #[must_use]
    pub fn choose(&self, observation: &Observation) -> Action {
        let probabilities = self.action_probabilities(observation);
        activation::argmax(&probabilities)
            .and_then(Action::from_index)
            .expect("output layer has one unit per action")
    }

    /// Recomputes [`Self::fitness`] from the episode score and decision histogram.
    pub fn compute_fitness(&mut self) -> f32 {
        self.fitness = fitness::fitness(self.episode_score, &self.decisions, self.config.stay_frac);
        self.fitness
    }

    /// Records the score at death and derives the episode's fitness.
    pub fn commit_death(&mut self, score: u32) -> f32 {
        self.episode_score = score;
        self.compute_fitness()
    }

    /// Clears score, fitness, and decision histogram for a new episode.
    pub fn begin_episode(&mut self) {
        self.episode_score = 0;
        self.fitness = 0.0;
        self.decisions = DecisionStats::default();
    }

    /// Swaps in a new genotype and starts a fresh episode.
    ///
    /// # Panics
    ///
    /// Panics if the genotype's hidden width differs from the configured one.
    pub fn replace_genotype(&mut self, genotype: Genotype) {
        assert_eq!(genotype.neurons(), self.config.neurons);
        self.genotype = genotype;
        self.begin_episode();
    }

    /// Replaces the genotype with the best one saved in `store`.
    ///
    /// On error the current genotype is kept.
    pub fn load_genome<B>(&mut self, store: &GenomeStore<B>) -> Result<(), GenomeStoreError>
    where
        B: GenomeBackend,
    {
        let genotype = store.load(self.config.neurons)?;
        self.replace_genotype(genotype);
        Ok(())
    }

    /// Saves this pilot's genotype as the best one in `store`.
    pub fn save_genome<B>(
        &self,
        store: &mut GenomeStore<B>,
        generation: Option<u64>,
    ) -> Result<(), GenomeStoreError>
    where
        B: GenomeBackend,
    {
        store.save(&self.genotype, generation)
    }
}

impl ShipController for Pilot {
    fn decide(&mut self, observation: &Observation) -> Action {
        let action = self.choose(observation);
        self.decisions.record(action);
        action
    }
}
