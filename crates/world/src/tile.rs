//! Tile layers and the tile attributes the agent cares about.
//!
//! Zones render three stacked tile layers. The agent only reads the handful
//! of attribute bits that affect navigation and goal selection; everything
//! else about a tile (art, animation, sounds) stays with the host game.
use bitflags::bitflags;

/// The three tile layers of a zone, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TileLayer {
    /// Ground terrain; never blocks by itself.
    Floor,
    /// Object layer; obstacles, pushable blocks and embedded items live here.
    Middle,
    /// Draw-over layer (roofs, arches); irrelevant to navigation.
    Top,
}

impl TileLayer {
    pub const ALL: [TileLayer; 3] = [TileLayer::Floor, TileLayer::Middle, TileLayer::Top];

    /// Stable index into per-zone layer storage.
    pub const fn index(self) -> usize {
        match self {
            TileLayer::Floor => 0,
            TileLayer::Middle => 1,
            TileLayer::Top => 2,
        }
    }
}

bitflags! {
    /// Navigation-relevant attribute bits of a tile definition.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u8 {
        /// The tile obstructs movement when placed on the middle layer.
        const OBSTACLE  = 1 << 0;
        /// The tile can be pushed aside, so it does not hard-block a path.
        const DRAGGABLE = 1 << 1;
        /// The tile is a collectible item embedded in the middle layer.
        const ITEM      = 1 << 2;
    }
}

impl TileFlags {
    /// Whether a middle-layer tile with these attributes stops a walker.
    pub fn blocks_walking(self) -> bool {
        self.contains(TileFlags::OBSTACLE) && !self.contains(TileFlags::DRAGGABLE)
    }
}
