//! Neural pilots: the decision function evolved by the genetic algorithm.
//!
//! A pilot maps what a ship sees (its own x position and the gap edges of the nearest
//! obstacle) to one of three actions using a tiny feed-forward network. The network's
//! parameters, the *genotype*, are the unit of inheritance during training.
//!
//! # Architecture
//!
//! ```text
//! Observation (ship_x, gap_left, gap_right) / screen_width
//!     ↓ W_in_hidden · x + b_hidden, ReLU          (hidden layer, NEURONS units)
//!     ↓ W_hidden_out · h + b_out, ReLU, softmax   (output layer, 3 units)
//!     ↓ argmax (lowest index wins ties)
//! Action (stay, left, right)
//! ```
//!
//! # Modules
//!
//! - [`activation`] - ReLU, softmax, and argmax primitives
//! - [`genotype`] - Dense matrices, layers, and the two-layer [`Genotype`](genotype::Genotype)
//! - [`fitness`] - Decision histogram and the stay-bonus term of the fitness score
//! - [`pilot`] - The [`Pilot`](pilot::Pilot) controller tying the above together
//! - [`genome_store`] - Persisting and restoring the best genotype
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use spaceai_engine::{Observation, ShipController as _};
//! use spaceai_pilot::pilot::{Pilot, PilotConfig};
//!
//! let mut rng = Pcg32::seed_from_u64(7);
//! let mut pilot = Pilot::random(PilotConfig::default(), &mut rng);
//!
//! let action = pilot.decide(&Observation::new(320.0, 100.0, 220.0));
//! assert_eq!(pilot.decisions().total(), 1);
//!
//! pilot.commit_death(12);
//! assert!(pilot.fitness() >= 12.0);
//! # let _ = action;
//! ```

pub mod activation;
pub mod fitness;
pub mod genome_store;
pub mod genotype;
pub mod pilot;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ActivationError {
    #[display("activation input must contain at least one value")]
    DegenerateInput,
}
