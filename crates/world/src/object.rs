//! Static zone objects: doors, item caches, spawn markers, triggers.
//!
//! Objects come out of the zone data with a kind, a cell and one integer
//! argument whose meaning depends on the kind (door destination, contained
//! item, script id). Typed accessors interpret the argument; the agent never
//! reads `arg` directly.
use crate::ids::{ItemId, ZoneId};
use crate::position::Point;

/// The object kinds that appear in zone data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    /// Walk-on passage to another zone; `arg` is the destination zone id.
    Door,
    /// Same as a door but placed mid-zone; `arg` is the destination zone id.
    Teleporter,
    /// Collectible container; `arg` is the contained item id.
    Crate,
    /// Collectible weapon pickup; `arg` is the item id.
    Weapon,
    /// Collectible locator/map pickup; `arg` is the item id.
    Locator,
    /// NPC spawn marker; `arg` is the character id. Inert for navigation.
    NpcSpawn,
    /// Script trigger cell; `arg` is script-defined. Inert for navigation.
    Trigger,
}

/// One static object entry of a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneObject {
    pub kind: ObjectKind,
    pub x: i32,
    pub y: i32,
    /// Kind-specific argument; negative means "not set".
    pub arg: i32,
}

impl ZoneObject {
    pub const fn new(kind: ObjectKind, x: i32, y: i32, arg: i32) -> Self {
        Self { kind, x, y, arg }
    }

    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// True for kinds the agent can pick up (crate/weapon/locator).
    pub fn is_item(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Crate | ObjectKind::Weapon | ObjectKind::Locator
        )
    }

    /// True for kinds that lead somewhere else (door/teleporter).
    pub fn is_passage(&self) -> bool {
        matches!(self.kind, ObjectKind::Door | ObjectKind::Teleporter)
    }

    /// Destination zone for passages, when the zone data names one.
    pub fn destination_zone(&self) -> Option<ZoneId> {
        if self.is_passage() && self.arg >= 0 {
            Some(ZoneId(self.arg as u16))
        } else {
            None
        }
    }

    /// Contained item for item objects, when the zone data names one.
    pub fn contained_item(&self) -> Option<ItemId> {
        if self.is_item() && self.arg >= 0 {
            Some(ItemId(self.arg as u16))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_is_interpreted_by_kind() {
        let door = ZoneObject::new(ObjectKind::Door, 4, 4, 7);
        assert_eq!(door.destination_zone(), Some(ZoneId(7)));
        assert_eq!(door.contained_item(), None);

        let chest = ZoneObject::new(ObjectKind::Crate, 0, 0, 12);
        assert_eq!(chest.contained_item(), Some(ItemId(12)));
        assert_eq!(chest.destination_zone(), None);

        let unknown_dest = ZoneObject::new(ObjectKind::Teleporter, 2, 2, -1);
        assert!(unknown_dest.is_passage());
        assert_eq!(unknown_dest.destination_zone(), None);
    }
}
