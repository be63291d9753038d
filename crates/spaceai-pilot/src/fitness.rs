//! Fitness of a pilot at the end of an episode.
//!
//! Raw survival score alone favors pilots that happen to survive while jittering left
//! and right every tick. The fitness adds a small behavioral term, the *stay bonus*,
//! that peaks when the fraction of "stay" decisions equals a configured target:
//!
//! ```text
//! fitness = episode_score + stay_bonus(stay_fraction, stay_frac)
//!
//! stay_bonus(x, t) = x / t              for 0 < x <= t
//!                  = (1 - x) / (1 - t)  for t < x <= 1
//!                  = 0                  otherwise
//! ```
//!
//! The bonus only applies once the pilot scored more than [`MIN_SCORE_FOR_BONUS`]
//! points, so ships that crash into the first obstacle cannot collect it.

use serde::{Deserialize, Serialize};
use spaceai_engine::Action;

/// Episode score a pilot must exceed before the stay bonus counts.
pub const MIN_SCORE_FOR_BONUS: u32 = 3;

/// Histogram of the decisions made during one episode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionStats {
    pub stay_count: u32,
    pub move_count: u32,
}

impl DecisionStats {
    /// Counts one decision. Left and right both count as a move.
    pub fn record(&mut self, action: Action) {
        match action {
            Action::Stay => self.stay_count += 1,
            Action::Left | Action::Right => self.move_count += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.stay_count + self.move_count
    }

    /// `stay_count / (stay_count + move_count)`, or 0 if nothing was decided yet.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn stay_fraction(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            total => self.stay_count as f32 / total as f32,
        }
    }
}

/// Piecewise-linear reward peaking at 1.0 when `x == stay_frac`.
///
/// # Examples
///
/// ```
/// use spaceai_pilot::fitness::stay_bonus;
///
/// assert_eq!(stay_bonus(0.25, 0.25), 1.0);
/// assert_eq!(stay_bonus(0.0, 0.25), 0.0);
/// assert_eq!(stay_bonus(1.5, 0.25), 0.0);
/// ```
#[must_use]
pub fn stay_bonus(x: f32, stay_frac: f32) -> f32 {
    if x > 0.0 && x <= stay_frac {
        x / stay_frac
    } else if x > stay_frac && x <= 1.0 {
        (1.0 - x) / (1.0 - stay_frac)
    } else {
        0.0
    }
}

/// Fitness for a finished episode.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn fitness(episode_score: u32, decisions: &DecisionStats, stay_frac: f32) -> f32 {
    let moves_distribution = if episode_score > MIN_SCORE_FOR_BONUS {
        decisions.stay_fraction()
    } else {
        0.0
    };
    episode_score as f32 + stay_bonus(moves_distribution, stay_frac)
}
