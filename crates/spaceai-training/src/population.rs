//! Population lifecycle and the generational loop.
//!
//! A [`Population`] owns a fixed number of ships, each steered by its own [`Pilot`].
//! Ships are allocated once by [`Population::populate`] and reused for every generation;
//! reproduction only swaps genotypes.
//!
//! # State Machine
//!
//! ```text
//! Empty ──populate──▶ Populated ──step──▶ Running ──mark_dead (last ship)──▶ AllDead
//!   ▲                                        ▲                                   │
//!   └────────────── erase_history ───────────┴────────────── evolve ─────────────┘
//! ```
//!
//! # Selection
//!
//! [`Population::evolve`] stable-sorts the ships by descending [`SelectionKey`] value. The
//! first `floor(selection_rate * population_size)` ships are the survivors: they stay in
//! slots `[0, n)` with their genotypes untouched. Pilots with equal keys keep their relative
//! order, so selection is deterministic for a given sequence of scores.
//!
//! # Reproduction
//!
//! Every slot from `n` on keeps its ship and pilot, but the pilot receives a new genotype
//! bred from two survivors (see [`reproduction::breed`]).

use rand::Rng;
use spaceai_engine::{ArenaConfig, ArenaError, GapObservation, SpaceShip};
use spaceai_pilot::{
    genome_store::{GenomeBackend, GenomeStore, GenomeStoreError},
    genotype::Genotype,
    pilot::{Pilot, PilotConfig},
};

use crate::{
    config::{ConfigError, EvolutionConfig, SelectionKey},
    reproduction,
    statistics::GenerationStats,
};

/// Ship type managed by a population.
pub type PilotedShip = SpaceShip<Pilot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PopulationState {
    /// No ships allocated.
    Empty,
    /// Ships allocated, no tick processed yet.
    Populated,
    /// At least one ship is alive and ticking.
    Running,
    /// Every ship has crashed; ready for [`Population::evolve`].
    AllDead,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PopulationError {
    #[display("invalid evolution config")]
    Config(ConfigError),
    #[display("invalid arena config")]
    Arena(ArenaError),
    #[display("population has no ships")]
    Empty,
    #[display("no survivors have been selected yet")]
    NoSurvivors,
    #[display("generation is still running with {living} ships alive")]
    StillRunning { living: usize },
    #[display("ship {index} does not exist in a population of {len}")]
    NoSuchShip { index: usize, len: usize },
    #[display("ship {index} is already dead")]
    AlreadyDead { index: usize },
    #[display("failed to save the best genome")]
    Store(GenomeStoreError),
}

#[derive(Debug, Clone)]
pub struct Population {
    config: EvolutionConfig,
    arena: ArenaConfig,
    pilot_config: PilotConfig,
    ships: Vec<PilotedShip>,
    survivor_count: usize,
    living_count: usize,
    generation_id: u64,
    state: PopulationState,
}

impl Population {
    /// Creates an empty population after validating both configurations.
    pub fn new(config: EvolutionConfig, arena: ArenaConfig) -> Result<Self, PopulationError> {
        config.validate().map_err(PopulationError::Config)?;
        arena.validate().map_err(PopulationError::Arena)?;
        Ok(Self {
            pilot_config: config.pilot_config(&arena),
            config,
            arena,
            ships: vec![],
            survivor_count: 0,
            living_count: 0,
            generation_id: 0,
            state: PopulationState::Empty,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn arena(&self) -> &ArenaConfig {
        &self.arena
    }

    #[must_use]
    pub fn pilot_config(&self) -> &PilotConfig {
        &self.pilot_config
    }

    /// Ships in slot order.
    #[must_use]
    pub fn ships(&self) -> &[PilotedShip] {
        &self.ships
    }

    /// Survivors of the last selection, best first. Empty before the first selection.
    #[must_use]
    pub fn survivors(&self) -> &[PilotedShip] {
        &self.ships[..self.survivor_count]
    }

    /// Pilot of the top-ranked survivor.
    #[must_use]
    pub fn best_pilot(&self) -> Option<&Pilot> {
        self.survivors().first().map(SpaceShip::controller)
    }

    #[must_use]
    pub fn generation_id(&self) -> u64 {
        self.generation_id
    }

    /// Ships alive as of the last [`Self::mark_dead`], [`Self::all_dead`], or respawn.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.living_count
    }

    #[must_use]
    pub fn state(&self) -> PopulationState {
        self.state
    }

    /// Allocates `population_size` ships with freshly randomized pilots.
    ///
    /// Any previous ships are dropped.
    pub fn populate<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let pilot_config = self.pilot_config;
        self.ships = (0..self.config.population_size)
            .map(|_| SpaceShip::new(&self.arena, Pilot::random(pilot_config, rng)))
            .collect();
        self.survivor_count = 0;
        self.living_count = self.ships.len();
        self.state = PopulationState::Populated;
        tracing::debug!(size = self.ships.len(), "populated");
    }

    /// Lets every living ship decide and move once.
    ///
    /// Returns the number of ships that moved.
    pub fn step(&mut self, gap: GapObservation) -> usize {
        let arena = self.arena;
        let moved = self
            .ships
            .iter_mut()
            .filter_map(|ship| ship.update(&arena, gap))
            .count();
        if self.state.is_populated() && moved > 0 {
            self.state = PopulationState::Running;
        }
        moved
    }

    /// Kills ship `index` and commits `score_at_death` to its pilot.
    ///
    /// The pilot's fitness is computed immediately. Returns that fitness.
    pub fn mark_dead(&mut self, index: usize, score_at_death: u32) -> Result<f32, PopulationError> {
        let len = self.ships.len();
        let ship = self
            .ships
            .get_mut(index)
            .ok_or(PopulationError::NoSuchShip { index, len })?;
        if !ship.is_alive() {
            return Err(PopulationError::AlreadyDead { index });
        }
        ship.kill();
        let fitness = ship.controller_mut().commit_death(score_at_death);
        self.living_count = self.living_count.saturating_sub(1);
        self.state = if self.living_count == 0 {
            PopulationState::AllDead
        } else {
            PopulationState::Running
        };
        tracing::trace!(index, score_at_death, fitness, "ship died");
        Ok(fitness)
    }

    /// Whether no ship is alive. Recounts [`Self::living_count`] as a side effect.
    ///
    /// An empty population counts as all dead.
    pub fn all_dead(&mut self) -> bool {
        self.living_count = self.ships.iter().filter(|s| s.is_alive()).count();
        if self.living_count == 0 && !self.ships.is_empty() {
            self.state = PopulationState::AllDead;
        }
        self.living_count == 0
    }

    /// Fitness summary of the current ships.
    #[must_use]
    pub fn statistics(&self) -> Option<GenerationStats> {
        GenerationStats::from_pilots(
            self.generation_id,
            self.ships.iter().map(SpaceShip::controller),
        )
    }

    /// Runs selection and reproduction, then starts the next generation.
    ///
    /// Returns the statistics of the generation that just ended. Every ship must have died
    /// first; otherwise [`PopulationError::StillRunning`] is returned and nothing changes.
    pub fn evolve<R>(&mut self, rng: &mut R) -> Result<GenerationStats, PopulationError>
    where
        R: Rng + ?Sized,
    {
        let stats = self.statistics().ok_or(PopulationError::Empty)?;
        if !self.state.is_all_dead() {
            return Err(PopulationError::StillRunning {
                living: self.living_count,
            });
        }
        self.select();

        let (survivors, rest) = self.ships.split_at_mut(self.survivor_count);
        let parents = survivors
            .iter()
            .map(|s| s.controller().genotype())
            .collect::<Vec<&Genotype>>();
        let mut mutated = 0;
        for ship in rest.iter_mut() {
            let child = reproduction::breed(
                &parents,
                self.config.mutation_policy,
                self.config.mutation_prob,
                rng,
            );
            ship.controller_mut().replace_genotype(child);
            mutated += 1;
        }

        self.resurrect_and_reposition();
        self.generation_id += 1;
        tracing::info!(
            generation = stats.generation,
            best_fitness = stats.best_fitness,
            mean_fitness = stats.mean_fitness,
            best_score = stats.best_score,
            survivors = self.survivor_count,
            children = mutated,
            "evolved generation"
        );
        Ok(stats)
    }

    /// Respawns every ship at the spawn point and starts a new episode for every pilot.
    pub fn resurrect_and_reposition(&mut self) {
        for ship in &mut self.ships {
            ship.respawn(&self.arena);
            ship.controller_mut().begin_episode();
        }
        self.living_count = self.ships.len();
        if !self.ships.is_empty() {
            self.state = PopulationState::Running;
        }
    }

    /// Saves the genotype of the top-ranked survivor, tagged with the current generation.
    pub fn save_best_genome<B>(&self, store: &mut GenomeStore<B>) -> Result<(), PopulationError>
    where
        B: GenomeBackend,
    {
        let best = self.best_pilot().ok_or(PopulationError::NoSurvivors)?;
        best.save_genome(store, Some(self.generation_id))
            .map_err(PopulationError::Store)
    }

    /// Stops the current generation early and saves its best genome.
    ///
    /// Ships still alive die with `score`, the population is ranked, and the best pilot's
    /// genotype is written to `store`. No reproduction takes place.
    pub fn break_simulation<B>(
        &mut self,
        score: u32,
        store: &mut GenomeStore<B>,
    ) -> Result<(), PopulationError>
    where
        B: GenomeBackend,
    {
        if self.ships.is_empty() {
            return Err(PopulationError::Empty);
        }
        for ship in self.ships.iter_mut().filter(|s| s.is_alive()) {
            ship.kill();
            ship.controller_mut().commit_death(score);
        }
        self.living_count = 0;
        self.state = PopulationState::AllDead;
        self.select();
        self.save_best_genome(store)
    }

    /// Drops every ship and resets the generation counter.
    pub fn erase_history(&mut self) {
        self.ships.clear();
        self.survivor_count = 0;
        self.living_count = 0;
        self.generation_id = 0;
        self.state = PopulationState::Empty;
    }

    /// [`Self::erase_history`] followed by [`Self::populate`].
    pub fn restart<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.erase_history();
        self.populate(rng);
    }

    #[expect(clippy::cast_precision_loss)]
    fn select(&mut self) {
        let key = self.config.selection_key;
        let value = |ship: &PilotedShip| {
            let pilot = ship.controller();
            match key {
                SelectionKey::Fitness => pilot.fitness(),
                SelectionKey::DeathScore => pilot.episode_score() as f32,
            }
        };
        // stable: equal keys keep their slot order
        self.ships.sort_by(|a, b| value(b).total_cmp(&value(a)));
        self.survivor_count = self.config.survivor_count().min(self.ships.len());
    }
}
