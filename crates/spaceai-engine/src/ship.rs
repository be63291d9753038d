use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ArenaConfig;

/// Decision made by a controller for one tick.
///
/// The discriminant order matches the output units of the neural pilot:
/// `0 - Stay`, `1 - Left`, `2 - Right`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[display("stay")]
    Stay,
    #[display("left")]
    Left,
    #[display("right")]
    Right,
}

impl Action {
    /// Number of distinct actions (and of output units in a pilot network).
    pub const LEN: usize = 3;

    /// All actions in output-unit order.
    pub const ALL: [Action; Self::LEN] = [Action::Stay, Action::Left, Action::Right];

    /// Output-unit index of this action.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Action::Stay => 0,
            Action::Left => 1,
            Action::Right => 2,
        }
    }

    /// Action for an output-unit index, `None` if out of range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Action::Stay),
            1 => Some(Action::Left),
            2 => Some(Action::Right),
            _ => None,
        }
    }

    /// Signed direction of travel: `-1` left, `0` stay, `1` right.
    #[must_use]
    pub const fn direction(self) -> f32 {
        match self {
            Action::Stay => 0.0,
            Action::Left => -1.0,
            Action::Right => 1.0,
        }
    }
}

/// Gap edges of the nearest obstacle, as reported by the obstacle collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapObservation {
    pub gap_left: f32,
    pub gap_right: f32,
}

impl GapObservation {
    #[must_use]
    pub const fn new(gap_left: f32, gap_right: f32) -> Self {
        Self {
            gap_left,
            gap_right,
        }
    }
}

/// Everything a controller sees in one tick, in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ship_x: f32,
    pub gap_left: f32,
    pub gap_right: f32,
}

impl Observation {
    #[must_use]
    pub const fn new(ship_x: f32, gap_left: f32, gap_right: f32) -> Self {
        Self {
            ship_x,
            gap_left,
            gap_right,
        }
    }

    /// Combines the ship's own position with the obstacle's gap edges.
    #[must_use]
    pub const fn from_gap(ship_x: f32, gap: GapObservation) -> Self {
        Self::new(ship_x, gap.gap_left, gap.gap_right)
    }

    /// Observation as an array in network input order.
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.ship_x, self.gap_left, self.gap_right]
    }
}

/// Steers a ship.
///
/// Called once per tick for every living ship. Implementations may keep per-episode
/// bookkeeping (the neural pilot counts its decisions), hence `&mut self`.
pub trait ShipController: fmt::Debug {
    /// Chooses the action for the current tick.
    fn decide(&mut self, observation: &Observation) -> Action;
}

/// A ship body steered by a controller.
///
/// Ships are created once and reused across episodes: when a generation ends the
/// ship is respawned in place instead of being reallocated, and only its controller's
/// state changes.
#[derive(Debug, Clone)]
pub struct SpaceShip<C> {
    position_x: f32,
    position_y: f32,
    half_width: f32,
    alive: bool,
    controller: C,
}

impl<C> SpaceShip<C> {
    /// Creates a living ship at the arena's spawn point.
    #[must_use]
    pub fn new(arena: &ArenaConfig, controller: C) -> Self {
        Self {
            position_x: arena.spawn_x,
            position_y: arena.spawn_y,
            half_width: arena.ship_half_width,
            alive: true,
            controller,
        }
    }

    #[must_use]
    pub fn position_x(&self) -> f32 {
        self.position_x
    }

    #[must_use]
    pub fn position_y(&self) -> f32 {
        self.position_y
    }

    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Marks the ship as crashed. Dead ships ignore [`Self::update`].
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Brings the ship back to life at the spawn point.
    pub fn respawn(&mut self, arena: &ArenaConfig) {
        self.alive = true;
        self.position_x = arena.spawn_x;
        self.position_y = arena.spawn_y;
    }
}

impl<C> SpaceShip<C>
where
    C: ShipController,
{
    /// Advances the ship by one tick.
    ///
    /// Asks the controller for a decision exactly once, moves by
    /// [`ArenaConfig::movement_speed`] in the chosen direction, and keeps the ship
    /// inside the screen. Returns the action taken, or `None` if the ship is dead.
    pub fn update(&mut self, arena: &ArenaConfig, gap: GapObservation) -> Option<Action> {
        if !self.alive {
            return None;
        }
        let observation = Observation::from_gap(self.position_x, gap);
        let action = self.controller.decide(&observation);
        self.position_x = arena.clamp_x(self.position_x + action.direction() * arena.movement_speed);
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Scripted {
        actions: Vec<Action>,
        seen: Vec<Observation>,
    }

    impl ShipController for Scripted {
        fn decide(&mut self, observation: &Observation) -> Action {
            self.seen.push(*observation);
            self.actions.remove(0)
        }
    }

    fn scripted(actions: &[Action]) -> Scripted {
        Scripted {
            actions: actions.to_vec(),
            seen: vec![],
        }
    }

    #[test]
    fn test_action_index_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Some(action));
        }
        assert_eq!(Action::from_index(3), None);
    }

    #[test]
    fn test_action_serialization() {
        assert_eq!(serde_json::to_string(&Action::Stay).unwrap(), "\"stay\"");
        assert_eq!(Action::Right.to_string(), "right");
    }

    #[test]
    fn test_update_moves_by_speed() {
        let arena = ArenaConfig::default();
        let mut ship = SpaceShip::new(
            &arena,
            scripted(&[Action::Left, Action::Stay, Action::Right, Action::Right]),
        );
        let gap = GapObservation::new(100.0, 250.0);

        assert_eq!(ship.update(&arena, gap), Some(Action::Left));
        assert_eq!(ship.position_x(), 310.0);
        assert_eq!(ship.update(&arena, gap), Some(Action::Stay));
        assert_eq!(ship.position_x(), 310.0);
        ship.update(&arena, gap);
        ship.update(&arena, gap);
        assert_eq!(ship.position_x(), 330.0);
    }

    #[test]
    fn test_update_passes_current_position_to_controller() {
        let arena = ArenaConfig::default();
        let mut ship = SpaceShip::new(&arena, scripted(&[Action::Right, Action::Stay]));
        let gap = GapObservation::new(40.0, 180.0);
        ship.update(&arena, gap);
        ship.update(&arena, gap);

        let seen = &ship.controller().seen;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Observation::new(320.0, 40.0, 180.0));
        assert_eq!(seen[1], Observation::new(330.0, 40.0, 180.0));
    }

    #[test]
    fn test_update_clamps_to_screen_edges() {
        let arena = ArenaConfig {
            spawn_x: 20.0,
            ..ArenaConfig::default()
        };
        let mut ship = SpaceShip::new(&arena, scripted(&[Action::Left]));
        ship.update(&arena, GapObservation::new(0.0, 100.0));
        assert_eq!(ship.position_x(), arena.ship_half_width);
    }

    #[test]
    fn test_dead_ship_does_not_decide() {
        let arena = ArenaConfig::default();
        let mut ship = SpaceShip::new(&arena, scripted(&[]));
        ship.kill();
        assert!(!ship.is_alive());
        assert_eq!(ship.update(&arena, GapObservation::new(0.0, 100.0)), None);
        assert!(ship.controller().seen.is_empty());
    }

    #[test]
    fn test_respawn_resets_position_and_liveness() {
        let arena = ArenaConfig::default();
        let mut ship = SpaceShip::new(&arena, scripted(&[Action::Right]));
        ship.update(&arena, GapObservation::new(0.0, 100.0));
        ship.kill();
        ship.respawn(&arena);
        assert!(ship.is_alive());
        assert_eq!(ship.position_x(), arena.spawn_x);
    }
}
