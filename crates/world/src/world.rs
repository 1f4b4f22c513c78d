//! The observation surface a simulation exposes to the agent.
use crate::ids::{ItemId, TileId, ZoneId};
use crate::npc::NpcState;
use crate::object::ZoneObject;
use crate::position::{Point, Position};
use crate::tile::{TileFlags, TileLayer};

/// Width and height of one zone's cell grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneDimensions {
    pub width: u32,
    pub height: u32,
}

impl ZoneDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && point.x < self.width as i32
            && point.y < self.height as i32
    }
}

/// Read surface of the running game, plus the single documented write (the
/// player's selected-item slot, set by the executor before it queues a
/// `UseItem` record).
///
/// The real game adapter and the scripted sandbox both implement this; the
/// agent is generic over it and owns no world state of its own. Queries take
/// an explicit zone id so goal selection can reason about zones the player is
/// not currently in.
///
/// # Design
///
/// The trait is synchronous and carries no `Send`/`Sync` bounds: the agent
/// and simulation share one cooperative tick thread. All zone queries must
/// answer for any zone id the world map names; `npcs`/`objects` return empty
/// slices for zones without content rather than panicking.
pub trait GameWorld {
    // ---- player ----

    fn player_zone(&self) -> ZoneId;

    fn player_point(&self) -> Point;

    fn player_position(&self) -> Position {
        Position::from_point(self.player_zone(), self.player_point())
    }

    /// Inventory in acquisition order; duplicates allowed.
    fn inventory(&self) -> &[ItemId];

    fn has_item(&self, item: ItemId) -> bool {
        self.inventory().contains(&item)
    }

    fn selected_item(&self) -> Option<ItemId>;

    /// Stages `item` (or clears the slot) as the operand of the next
    /// `UseItem` primitive.
    fn select_item(&mut self, item: Option<ItemId>);

    fn mission_won(&self) -> bool;

    fn mission_lost(&self) -> bool;

    // ---- zone contents ----

    fn zone_dimensions(&self, zone: ZoneId) -> ZoneDimensions;

    /// Tile at `at` on `layer`, `None` for an empty cell.
    fn tile(&self, zone: ZoneId, layer: TileLayer, at: Point) -> Option<TileId>;

    /// Attribute bits for a tile definition.
    fn tile_flags(&self, tile: TileId) -> TileFlags;

    /// Static object list of the zone, in zone-data order.
    fn objects(&self, zone: ZoneId) -> &[ZoneObject];

    /// Currently active NPCs of the zone, in spawn order.
    fn npcs(&self, zone: ZoneId) -> &[NpcState];

    /// Whether the collectible at `at` (object or embedded tile item) has
    /// already been taken.
    fn object_collected(&self, zone: ZoneId, at: Point) -> bool;

    /// Whether the zone's goal script has marked it solved.
    fn zone_solved(&self, zone: ZoneId) -> bool;
}
