//! Observed NPC snapshots and disposition classification.
use bitflags::bitflags;

use crate::ids::NpcId;
use crate::position::Point;

bitflags! {
    /// Status bits reported by the simulation for an active NPC.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct NpcFlags: u8 {
        const ALIVE   = 1 << 0;
        /// Disabled NPCs are parked by zone scripts: invisible, intangible.
        const ENABLED = 1 << 1;
        const HOSTILE = 1 << 2;
    }
}

/// One active NPC as the agent observes it this tick.
///
/// Snapshots are positional: the agent keys its talked-to/tried-item memory
/// by the NPC's current cell, not by instance identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NpcState {
    pub id: NpcId,
    pub x: i32,
    pub y: i32,
    pub health: i32,
    pub flags: NpcFlags,
}

impl NpcState {
    pub const fn new(id: NpcId, x: i32, y: i32, health: i32, flags: NpcFlags) -> Self {
        Self {
            id,
            x,
            y,
            health,
            flags,
        }
    }

    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_alive(&self) -> bool {
        self.flags.contains(NpcFlags::ALIVE)
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(NpcFlags::ENABLED)
    }

    pub fn is_hostile(&self) -> bool {
        self.flags.contains(NpcFlags::HOSTILE)
    }

    /// Whether the NPC occupies its cell for navigation purposes.
    pub fn blocks_movement(&self) -> bool {
        self.is_alive() && self.is_enabled()
    }
}

/// How the agent should treat an NPC. Produced by an injectable classifier so
/// goal selection stays testable without real game content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Disposition {
    Friendly,
    Hostile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_or_disabled_npcs_do_not_block() {
        let live = NpcState::new(NpcId(3), 1, 1, 10, NpcFlags::ALIVE | NpcFlags::ENABLED);
        assert!(live.blocks_movement());

        let dead = NpcState::new(NpcId(3), 1, 1, 0, NpcFlags::ENABLED);
        assert!(!dead.blocks_movement());

        let parked = NpcState::new(NpcId(3), 1, 1, 10, NpcFlags::ALIVE);
        assert!(!parked.blocks_movement());
    }
}
