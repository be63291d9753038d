//! Evolution of pilot populations using a genetic algorithm.
//!
//! This crate drives the generational loop of simulation mode. The game loop owns the
//! obstacles and collision checks; this crate owns the ships and their pilots and decides
//! which genotypes survive into the next generation.
//!
//! # How Training Works
//!
//! 1. **Populate** - Create `population_size` ships, each with a random pilot
//! 2. **Run** - Every tick, [`Population::step`](population::Population::step) lets each living pilot steer
//! 3. **Score** - When a ship collides, [`Population::mark_dead`](population::Population::mark_dead)
//!    commits its score and computes its fitness
//! 4. **Select** - Once all ships are dead, the top `selection_rate` fraction by fitness
//!    survives unchanged
//! 5. **Reproduce** - Every other slot receives a child of two random survivors
//!    (crossover, then possibly mutation)
//! 6. **Repeat** - Ships are respawned and the next generation starts
//!
//! # Architecture
//!
//! ```text
//! Game loop (obstacles, collisions, rendering)
//!     ↓ gap observations, death scores
//! Population (this crate)
//!     ↓ owns
//! SpaceShip<Pilot> (spaceai-engine, spaceai-pilot)
//!     ↓ reproduced by
//! reproduction::breed (crossover + mutation)
//! ```
//!
//! # Modules
//!
//! - [`config`] - [`EvolutionConfig`](config::EvolutionConfig) and the selectable policies
//! - [`population`] - The population lifecycle and its state machine
//! - [`reproduction`] - Crossover and mutation operators
//! - [`statistics`] - Per-generation fitness summaries
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use spaceai_engine::{ArenaConfig, GapObservation};
//! use spaceai_training::{config::EvolutionConfig, population::Population};
//!
//! let config = EvolutionConfig {
//!     population_size: 10,
//!     selection_rate: 0.3,
//!     ..EvolutionConfig::default()
//! };
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut population = Population::new(config, ArenaConfig::default()).unwrap();
//! population.populate(&mut rng);
//!
//! population.step(GapObservation::new(200.0, 350.0));
//! for (i, score) in (0..10).zip([4, 9, 1, 7, 3, 3, 8, 2, 6, 5]) {
//!     population.mark_dead(i, score).unwrap();
//! }
//! assert!(population.all_dead());
//!
//! let stats = population.evolve(&mut rng).unwrap();
//! assert_eq!(stats.best_score, 9);
//! assert_eq!(population.generation_id(), 1);
//! assert_eq!(population.living_count(), 10);
//! ```
//!
//! # Current Limitations
//!
//! - **Whole-genotype mutation**: mutation either re-draws every parameter or scales all of
//!   them by one factor; there is no per-weight jitter
//! - **Sequential ticks**: pilots decide one after another; the networks are tiny, so the
//!   per-tick cost is dominated by the game loop anyway

pub mod config;
pub mod population;
pub mod reproduction;
pub mod statistics;
