use serde::{Deserialize, Serialize};

use crate::ArenaError;

/// Fixed geometry of the playing field.
///
/// All positions are in screen units. The pilot normalizes its observations by
/// [`screen_width`](Self::screen_width), so changing it also changes what a trained
/// genome sees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Width of the screen, also the normalization constant for observations.
    pub screen_width: f32,
    /// Horizontal spawn position of every ship.
    pub spawn_x: f32,
    /// Vertical position of every ship (ships never move vertically).
    pub spawn_y: f32,
    /// Half of the ship's width, used to keep it inside the screen.
    pub ship_half_width: f32,
    /// Horizontal distance moved per tick when steering left or right.
    pub movement_speed: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            screen_width: 640.0,
            spawn_x: 320.0,
            spawn_y: 50.0,
            ship_half_width: 15.0,
            movement_speed: 10.0,
        }
    }
}

impl ArenaConfig {
    /// Leftmost x the ship's center can reach.
    #[must_use]
    pub fn min_x(&self) -> f32 {
        self.ship_half_width
    }

    /// Rightmost x the ship's center can reach.
    #[must_use]
    pub fn max_x(&self) -> f32 {
        self.screen_width - self.ship_half_width
    }

    /// Clamps a ship center position to the reachable range.
    #[must_use]
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.min_x(), self.max_x())
    }

    /// Checks that the geometry is usable.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.screen_width <= 0.0 {
            return Err(ArenaError::NonPositiveWidth {
                width: self.screen_width,
            });
        }
        if self.ship_half_width < 0.0 || 2.0 * self.ship_half_width > self.screen_width {
            return Err(ArenaError::ShipTooWide {
                half_width: self.ship_half_width,
                width: self.screen_width,
            });
        }
        if !(self.min_x()..=self.max_x()).contains(&self.spawn_x) {
            return Err(ArenaError::SpawnOutOfRange {
                spawn_x: self.spawn_x,
                min: self.min_x(),
                max: self.max_x(),
            });
        }
        Ok(())
    }
}
