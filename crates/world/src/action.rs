//! Primitive action records emitted by the agent.
//!
//! Every effect the agent has on the game funnels through these records: the
//! agent queues them, the simulation drains and applies them before the next
//! tick so the agent can observe the outcome. The record deliberately carries
//! no item payload — item use goes through the player's selected-item slot,
//! written by the executor before the `UseItem` record is queued.
use core::fmt;

use crate::position::{Direction, Point};

/// The five primitive verbs the simulation understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Move,
    Attack,
    Talk,
    UseItem,
    UseXWing,
}

/// One primitive action request: a verb, a target cell and an optional
/// facing direction, interpreted within the player's current zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub x: i32,
    pub y: i32,
    pub direction: Option<Direction>,
}

impl ActionRequest {
    pub const fn new(kind: ActionKind, x: i32, y: i32, direction: Option<Direction>) -> Self {
        Self {
            kind,
            x,
            y,
            direction,
        }
    }

    /// A step onto `to`, facing the way it was approached from.
    pub const fn step(to: Point, direction: Direction) -> Self {
        Self::new(ActionKind::Move, to.x, to.y, Some(direction))
    }

    /// A melee swing at `at`, facing `direction`.
    pub const fn attack(at: Point, direction: Direction) -> Self {
        Self::new(ActionKind::Attack, at.x, at.y, Some(direction))
    }

    /// A conversation opener toward the NPC standing at `at`.
    pub const fn talk(at: Point, direction: Direction) -> Self {
        Self::new(ActionKind::Talk, at.x, at.y, Some(direction))
    }

    /// Applies the player's selected item toward `at`.
    pub const fn use_item(at: Point, direction: Option<Direction>) -> Self {
        Self::new(ActionKind::UseItem, at.x, at.y, direction)
    }

    /// Boards the X-Wing from the player's cell `at`.
    pub const fn use_xwing(at: Point) -> Self {
        Self::new(ActionKind::UseXWing, at.x, at.y, None)
    }

    pub const fn target(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(dir) => write!(f, "{} ({}, {}) {}", self.kind, self.x, self.y, dir),
            None => write!(f, "{} ({}, {})", self.kind, self.x, self.y),
        }
    }
}
