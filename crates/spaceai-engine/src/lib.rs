//! Ship body and the per-tick contracts between a controller and the game loop.
//!
//! This crate holds the parts of the game that the evolutionary pilot talks to directly:
//!
//! - [`Action`] - The discrete decision a controller makes each tick (stay, left, right)
//! - [`Observation`] / [`GapObservation`] - The numeric inputs a controller sees
//! - [`ShipController`] - Anything that can steer a ship (the neural pilot, scripted test controllers)
//! - [`SpaceShip`] - A ship body that moves according to its controller's decisions
//! - [`ArenaConfig`] - Screen size, spawn point, and movement speed
//!
//! Obstacle generation, collision geometry, and rendering live outside this crate. The game
//! loop only hands each ship the gap edges of the nearest obstacle and tells the population
//! when a ship has collided.
//!
//! # Example
//!
//! ```
//! use spaceai_engine::{Action, ArenaConfig, GapObservation, Observation, ShipController, SpaceShip};
//!
//! #[derive(Debug)]
//! struct AlwaysLeft;
//!
//! impl ShipController for AlwaysLeft {
//!     fn decide(&mut self, _observation: &Observation) -> Action {
//!         Action::Left
//!     }
//! }
//!
//! let arena = ArenaConfig::default();
//! let mut ship = SpaceShip::new(&arena, AlwaysLeft);
//! let action = ship.update(&arena, GapObservation::new(100.0, 200.0));
//!
//! assert_eq!(action, Some(Action::Left));
//! assert_eq!(ship.position_x(), arena.spawn_x - arena.movement_speed);
//! ```

pub use self::{arena::*, ship::*};

mod arena;
mod ship;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ArenaError {
    #[display("screen width must be positive, got {width}")]
    NonPositiveWidth { width: f32 },
    #[display("ship half width {half_width} does not fit on a screen {width} wide")]
    ShipTooWide { half_width: f32, width: f32 },
    #[display("spawn x {spawn_x} is outside the reachable range [{min}, {max}]")]
    SpawnOutOfRange { spawn_x: f32, min: f32, max: f32 },
}
