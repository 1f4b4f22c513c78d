//! Shared world vocabulary between the autonomous agent and its host game.
//!
//! `agent-world` defines the value types the agent observes (positions, tiles,
//! zone objects, NPC snapshots), the [`GameWorld`] surface a simulation must
//! implement for the agent to play it, the static [`WorldMap`] produced by the
//! world generator, and the primitive [`ActionRequest`] records the agent
//! emits back. A scripted in-memory simulation ([`ScriptedWorld`]) is included
//! for harnesses and tests.
pub mod action;
pub mod ids;
pub mod map;
pub mod npc;
pub mod object;
pub mod position;
#[cfg(feature = "serde")]
pub mod scenario;
pub mod scripted;
pub mod tile;
pub mod world;

pub use action::{ActionKind, ActionRequest};
pub use ids::{ItemId, NpcId, TileId, ZoneId};
pub use map::{WorldMap, WorldMapError};
pub use npc::{Disposition, NpcFlags, NpcState};
pub use object::{ObjectKind, ZoneObject};
pub use position::{Direction, Point, Position};
#[cfg(feature = "serde")]
pub use scenario::{Scenario, ScenarioError};
pub use scripted::{
    NpcScript, PUSH_TILE, ScriptedWorld, WALL_TILE, ZoneBuilder, friendly_npc, hostile_npc,
};
pub use tile::{TileFlags, TileLayer};
pub use world::{GameWorld, ZoneDimensions};
