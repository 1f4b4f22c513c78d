//! Declarative scenario files for the scripted sandbox.
//!
//! A scenario is a serde tree (the runner stores them as RON) describing the
//! world map, tile definitions, zone contents and NPC scripts. `into_world`
//! validates it against the map and produces a ready [`ScriptedWorld`].
use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, NpcId, TileId, ZoneId};
use crate::map::{WorldMap, WorldMapError};
use crate::npc::{NpcFlags, NpcState};
use crate::object::ZoneObject;
use crate::position::Point;
use crate::scripted::{NpcScript, ScriptedWorld, ZoneBuilder};
use crate::tile::{TileFlags, TileLayer};
use crate::world::GameWorld;

/// Errors from scenario validation.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Map(#[from] WorldMapError),
    #[error("{zone} is declared more than once")]
    DuplicateZone { zone: ZoneId },
    #[error("{zone} has contents but is not placed in the world map")]
    ZoneNotInMap { zone: ZoneId },
    #[error("start cell ({x}, {y}) is outside {zone}")]
    StartOutOfBounds { zone: ZoneId, x: i32, y: i32 },
}

/// Root scenario document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub map: ScenarioMap,
    /// Extra tile definitions beyond the built-in wall/pushable tiles.
    #[serde(default)]
    pub tiles: Vec<ScenarioTile>,
    pub zones: Vec<ScenarioZone>,
    /// Player start; defaults to the home zone's arrival cell.
    #[serde(default)]
    pub start: Option<ScenarioStart>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioMap {
    pub width: u32,
    pub height: u32,
    /// Row-major zone grid; `None` for empty world cells.
    pub cells: Vec<Option<ZoneId>>,
    pub home: ZoneId,
    #[serde(default)]
    pub objective: Option<ZoneId>,
    #[serde(default)]
    pub starting_item: Option<ItemId>,
    #[serde(default)]
    pub home_npc: Option<NpcId>,
    /// Where the X-Wing lands when leaving home; defaults to the objective.
    #[serde(default)]
    pub landing: Option<ZoneId>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScenarioTile {
    pub id: TileId,
    #[serde(default)]
    pub obstacle: bool,
    #[serde(default)]
    pub draggable: bool,
    #[serde(default)]
    pub item: bool,
}

impl ScenarioTile {
    fn flags(&self) -> TileFlags {
        let mut flags = TileFlags::empty();
        if self.obstacle {
            flags |= TileFlags::OBSTACLE;
        }
        if self.draggable {
            flags |= TileFlags::DRAGGABLE;
        }
        if self.item {
            flags |= TileFlags::ITEM;
        }
        flags
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioZone {
    pub id: ZoneId,
    pub width: u32,
    pub height: u32,
    /// Hard walls, placed on the middle layer.
    #[serde(default)]
    pub walls: Vec<(i32, i32)>,
    #[serde(default)]
    pub tiles: Vec<ScenarioTilePlacement>,
    #[serde(default)]
    pub objects: Vec<ZoneObject>,
    #[serde(default)]
    pub npcs: Vec<ScenarioNpc>,
    /// Arrival cell for doors and X-Wing landings.
    #[serde(default)]
    pub entry: Option<(i32, i32)>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScenarioTilePlacement {
    pub layer: TileLayer,
    pub x: i32,
    pub y: i32,
    pub tile: TileId,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScenarioNpc {
    pub id: NpcId,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_health")]
    pub health: i32,
    #[serde(default)]
    pub hostile: bool,
    #[serde(default)]
    pub disabled: bool,
    /// Item granted on first talk.
    #[serde(default)]
    pub gives: Option<ItemId>,
    /// Item that satisfies this NPC when used on it.
    #[serde(default)]
    pub wants: Option<ItemId>,
    /// Satisfying `wants` marks the zone solved.
    #[serde(default)]
    pub solves_zone: bool,
}

fn default_health() -> i32 {
    10
}

impl ScenarioNpc {
    fn state(&self) -> NpcState {
        let mut flags = NpcFlags::empty();
        if self.health > 0 {
            flags |= NpcFlags::ALIVE;
        }
        if !self.disabled {
            flags |= NpcFlags::ENABLED;
        }
        if self.hostile {
            flags |= NpcFlags::HOSTILE;
        }
        NpcState::new(self.id, self.x, self.y, self.health, flags)
    }

    fn script(&self) -> Option<NpcScript> {
        if self.gives.is_none() && self.wants.is_none() && !self.solves_zone {
            return None;
        }
        Some(NpcScript {
            gives: self.gives,
            wants: self.wants,
            solves_zone: self.solves_zone,
        })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScenarioStart {
    pub zone: ZoneId,
    pub x: i32,
    pub y: i32,
}

impl Scenario {
    /// Validates the scenario and builds the sandbox world.
    pub fn into_world(self) -> Result<ScriptedWorld, ScenarioError> {
        let mut map = WorldMap::new(
            self.map.width,
            self.map.height,
            self.map.cells.clone(),
            self.map.home,
        )?;
        if let Some(objective) = self.map.objective {
            map = map.with_objective(objective)?;
        }
        if let Some(item) = self.map.starting_item {
            map = map.with_starting_item(item);
        }
        if let Some(npc) = self.map.home_npc {
            map = map.with_home_npc(npc);
        }

        let mut world = ScriptedWorld::new(map);
        for tile in &self.tiles {
            world.define_tile(tile.id, tile.flags());
        }
        if let Some(landing) = self.map.landing {
            world.set_landing_zone(landing);
        }

        let mut declared: Vec<ZoneId> = Vec::new();
        for zone in &self.zones {
            if declared.contains(&zone.id) {
                return Err(ScenarioError::DuplicateZone { zone: zone.id });
            }
            if !world.map().contains(zone.id) {
                return Err(ScenarioError::ZoneNotInMap { zone: zone.id });
            }
            declared.push(zone.id);

            let mut builder = ZoneBuilder::new(zone.width, zone.height);
            for &(x, y) in &zone.walls {
                builder = builder.wall(x, y);
            }
            for placement in &zone.tiles {
                builder = builder.tile(placement.layer, placement.x, placement.y, placement.tile);
            }
            for object in &zone.objects {
                builder = builder.object(*object);
            }
            for npc in &zone.npcs {
                builder = builder.npc(npc.state());
            }
            if let Some((x, y)) = zone.entry {
                builder = builder.entry(x, y);
            }
            world.add_zone(zone.id, builder);

            for npc in &zone.npcs {
                if let Some(script) = npc.script() {
                    world.set_npc_script(zone.id, npc.id, script);
                }
            }
        }

        let start = match self.start {
            Some(start) => start,
            None => {
                let home = world.map().home_zone();
                let dims = world.zone_dimensions(home);
                ScenarioStart {
                    zone: home,
                    x: dims.width as i32 / 2,
                    y: dims.height as i32 / 2,
                }
            }
        };
        if !world
            .zone_dimensions(start.zone)
            .contains(Point::new(start.x, start.y))
        {
            return Err(ScenarioError::StartOutOfBounds {
                zone: start.zone,
                x: start.x,
                y: start.y,
            });
        }
        world.place_player(start.zone, Point::new(start.x, start.y));
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_scenario() -> Scenario {
        Scenario {
            map: ScenarioMap {
                width: 1,
                height: 1,
                cells: vec![Some(ZoneId(1))],
                home: ZoneId(1),
                objective: None,
                starting_item: None,
                home_npc: None,
                landing: None,
            },
            tiles: Vec::new(),
            zones: vec![ScenarioZone {
                id: ZoneId(1),
                width: 5,
                height: 5,
                walls: vec![(1, 1)],
                tiles: Vec::new(),
                objects: Vec::new(),
                npcs: vec![ScenarioNpc {
                    id: NpcId(3),
                    x: 4,
                    y: 4,
                    health: 10,
                    hostile: true,
                    disabled: false,
                    gives: None,
                    wants: None,
                    solves_zone: false,
                }],
                entry: None,
            }],
            start: None,
        }
    }

    #[test]
    fn builds_a_playable_world() {
        let world = minimal_scenario().into_world().unwrap();
        assert_eq!(world.player_zone(), ZoneId(1));
        assert_eq!(world.player_point(), Point::new(2, 2));
        assert_eq!(world.npcs(ZoneId(1)).len(), 1);
        assert!(world.npcs(ZoneId(1))[0].is_hostile());
    }

    #[test]
    fn rejects_zones_missing_from_the_map() {
        let mut scenario = minimal_scenario();
        scenario.zones[0].id = ZoneId(99);
        assert!(matches!(
            scenario.into_world(),
            Err(ScenarioError::ZoneNotInMap { .. })
        ));
    }

    #[test]
    fn rejects_out_of_bounds_start() {
        let mut scenario = minimal_scenario();
        scenario.start = Some(ScenarioStart {
            zone: ZoneId(1),
            x: 9,
            y: 0,
        });
        assert!(matches!(
            scenario.into_world(),
            Err(ScenarioError::StartOutOfBounds { .. })
        ));
    }
}
